use super::casino::Casino;
use super::message::Message;
use super::message::now_ms;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;

/// Runs the HTTP/WebSocket listener. One WS route carries the whole
/// protocol; the two GET routes are the non-core operational surface.
pub async fn run(casino: Arc<Casino>, port: u16) -> Result<(), std::io::Error> {
    let state = web::Data::new(casino);
    log::info!("listening on port {}", port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(state.clone())
            .route("/ws", web::get().to(enter))
            .route("/health", web::get().to(health))
            .route("/api/tables", web::get().to(tables))
    })
    .workers(4)
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

async fn health(casino: web::Data<Arc<Casino>>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": now_ms(),
        "connections": casino.sessions().count().await,
        "tables": casino.table_count().await,
    }))
}

async fn tables(casino: web::Data<Arc<Casino>>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "tables": casino.lobby().await }))
}

/// WebSocket handshake plus the per-connection pump: outbound frames
/// drain ahead of inbound ones so broadcasts keep their engine order.
async fn enter(
    casino: web::Data<Arc<Casino>>,
    req: HttpRequest,
    body: web::Payload,
) -> impl Responder {
    match actix_ws::handle(&req, body) {
        Ok((response, mut ws, mut stream)) => {
            let casino = casino.get_ref().clone();
            actix_web::rt::spawn(async move {
                let (tx, mut rx) = unbounded_channel::<String>();
                let record = casino.sessions().create(tx.clone()).await;
                let mut session_id = record.session_id.clone();
                let hello = Message::Session {
                    session_id: session_id.clone(),
                    user_id: None,
                };
                if ws.text(hello.to_json()).await.is_err() {
                    casino.disconnect(&session_id).await;
                    return;
                }
                'sesh: loop {
                    tokio::select! {
                        biased;
                        frame = rx.recv() => match frame {
                            Some(json) => if ws.text(json).await.is_err() { break 'sesh },
                            None => break 'sesh,
                        },
                        msg = stream.next() => match msg {
                            Some(Ok(actix_ws::Message::Text(text))) => {
                                casino.handle(&mut session_id, &tx, &text).await
                            }
                            Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                            Some(Err(_)) => break 'sesh,
                            None => break 'sesh,
                            _ => continue 'sesh,
                        },
                    }
                }
                casino.disconnect(&session_id).await;
            });
            response.map_into_left_body()
        }
        Err(e) => HttpResponse::InternalServerError()
            .body(e.to_string())
            .map_into_right_body(),
    }
}

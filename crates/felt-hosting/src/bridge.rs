use super::casino::Casino;
use super::command::ActionKind;
use super::command::Command;
use super::command::ParseError;
use super::command::parse;
use super::message::Message;
use super::snapshot::TableView;
use felt_core::Chips;
use felt_core::Position;
use felt_core::canonical;
use felt_engine::Action;
use felt_engine::Event;
use felt_engine::RoomHandle;
use felt_session::SessionRecord;
use felt_session::Socket;
use felt_store::SESSION_PREFIX;

/// The bridge: stateless translation from client frames to engine events.
///
/// Lives as an impl block on [`Casino`] because every translation needs
/// the room registry, the session manager, and the seat maps — but holds
/// no state of its own. Validation failures reply with an `ERROR` and a
/// fresh sanitized snapshot so the client can resync.
impl Casino {
    /// Handles one inbound frame. `session_id` is the connection's
    /// current session and may be rebound by a successful `REATTACH`.
    pub async fn handle(&self, session_id: &mut String, socket: &Socket, frame: &str) {
        let command = match parse(frame) {
            Ok(command) => command,
            Err(ParseError::BadMessage) => {
                log::debug!("[bridge] unparseable frame from {}", session_id);
                return self.reply(socket, Message::error("BAD_MESSAGE", "unparseable frame"));
            }
            Err(ParseError::UnknownCommand) => {
                log::debug!("[bridge] unknown command from {}", session_id);
                return self.reply(socket, Message::error("UNKNOWN_COMMAND", "unknown command"));
            }
        };
        match command {
            Command::ListTables => {
                self.reply(socket, Message::TableList { tables: self.lobby().await });
            }
            Command::JoinTable { table_id } => self.on_join_table(session_id, socket, table_id).await,
            Command::CreateTable { name } => {
                let spec = self.create_table(&name).await;
                self.reply(socket, Message::TableCreated { table: spec.lobby() });
            }
            Command::Sit { table_id, seat, chips, player_id } => {
                self.on_sit(session_id, socket, table_id, seat, chips, player_id).await
            }
            Command::Leave => self.on_leave(session_id, socket).await,
            Command::SitOut => self.on_sit_toggle(session_id, socket, true).await,
            Command::SitIn => self.on_sit_toggle(session_id, socket, false).await,
            Command::Action { action, amount } => {
                self.on_action(session_id, socket, action, amount).await
            }
            Command::Attach { user_id } => self.on_attach(session_id, socket, user_id).await,
            Command::Reattach { session_id: target } => {
                self.on_reattach(session_id, socket, target).await
            }
        }
    }

    fn reply(&self, socket: &Socket, msg: Message) {
        let _ = socket.send(msg.to_json());
    }

    /// Sends the caller a fresh sanitized snapshot of its table, if any.
    /// Every validation rejection is followed by one of these.
    async fn resync(&self, session_id: &str, socket: &Socket) {
        let Some(record) = self.sessions().get(session_id).await else {
            return;
        };
        let Some(room_id) = record.room_id.clone() else {
            return;
        };
        let Some(handle) = self.room(&room_id).await else {
            return;
        };
        let Some(table) = handle.snapshot().await else {
            return;
        };
        let viewer = record
            .user_id
            .clone()
            .unwrap_or_else(|| canonical(&record.session_id));
        self.reply(
            socket,
            Message::TableSnapshot {
                table_id: room_id,
                table: TableView::from(&table).sanitized_for(&viewer),
            },
        );
    }

    // ------------------------------------------------------------------
    // table membership
    // ------------------------------------------------------------------
    async fn on_join_table(&self, session_id: &str, socket: &Socket, table_id: String) {
        let Some(handle) = self.room(&table_id).await else {
            return self.reply(socket, Message::error("TABLE_NOT_FOUND", table_id));
        };
        if self
            .sessions()
            .bind_room(session_id, Some(table_id.clone()), None, 0, None)
            .await
            .is_err()
        {
            return self.reply(socket, Message::error("COMMAND_FAILED", "no session"));
        }
        if let Some(table) = handle.snapshot().await {
            let viewer = self.viewer_id(session_id).await;
            self.reply(
                socket,
                Message::TableSnapshot {
                    table_id,
                    table: TableView::from(&table).sanitized_for(&viewer),
                },
            );
        }
    }

    async fn on_sit(
        &self,
        session_id: &str,
        socket: &Socket,
        table_id: String,
        seat: Position,
        chips: Option<Chips>,
        player_id: Option<String>,
    ) {
        let Some(handle) = self.room(&table_id).await else {
            return self.reply(socket, Message::error("TABLE_NOT_FOUND", table_id));
        };
        let Some(spec) = self.spec(&table_id).await else {
            return self.reply(socket, Message::error("TABLE_NOT_FOUND", table_id));
        };
        if seat >= felt_core::N {
            self.reply(socket, Message::error("COMMAND_FAILED", "seat out of range"));
            return self.resync(session_id, socket).await;
        }
        // command-provided identity takes precedence and binds to the
        // session before anything else happens
        let pid = match &player_id {
            Some(raw) => match self.sessions().bind(session_id, raw).await {
                Ok(record) => record.canonical_id(),
                Err(e) => {
                    return self.reply(socket, Message::error("COMMAND_FAILED", e.to_string()));
                }
            },
            None => self.viewer_id(session_id).await,
        };
        let buyin = chips.unwrap_or_else(|| spec.default_buyin());
        if buyin < spec.min_buyin() || buyin > spec.max_buyin() {
            self.reply(socket, Message::error("ILLEGAL_AMOUNT", "buy-in out of range"));
            return self.resync(session_id, socket).await;
        }
        let nickname = player_id
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| pid.clone());
        let event = Event::PlayerJoin {
            seat,
            pid: pid.clone(),
            nickname: nickname.clone(),
            chips: buyin,
        };
        match handle.dispatch(event).await {
            Ok(_) => {
                self.registry().set(&table_id, &pid, seat).await;
                let _ = self
                    .sessions()
                    .bind_room(session_id, Some(table_id), Some(seat), buyin, Some(nickname))
                    .await;
                // reconnects depend on this binding: wait for the write
                self.persist_session(session_id).await;
            }
            Err(e) => {
                log::debug!("[bridge] sit rejected for {}: {}", pid, e);
                self.reply(socket, Message::error(e.code(), e.to_string()));
                self.resync(session_id, socket).await;
            }
        }
    }

    async fn on_leave(&self, session_id: &str, socket: &Socket) {
        let Some(record) = self.sessions().get(session_id).await else {
            return;
        };
        let Some(room_id) = record.room_id.clone() else {
            return self.reply(socket, Message::error("COMMAND_FAILED", "not at a table"));
        };
        let pid = self.viewer_id(session_id).await;
        if let Some(handle) = self.room(&room_id).await {
            if let Some(seat) = self.resolve_seat(&handle, &room_id, &pid, session_id).await {
                if let Err(e) = handle.dispatch(Event::PlayerLeave { seat, pid: pid.clone() }).await
                {
                    log::debug!("[bridge] leave rejected for {}: {}", pid, e);
                }
            }
        }
        self.registry().remove(&room_id, &pid).await;
        let _ = self.sessions().bind_room(session_id, None, None, 0, None).await;
        self.persist_session(session_id).await;
    }

    async fn on_sit_toggle(&self, session_id: &str, socket: &Socket, out: bool) {
        let Some((handle, room_id, seat)) = self.seated_context(session_id).await else {
            self.reply(socket, Message::error("COMMAND_FAILED", "not seated"));
            return self.resync(session_id, socket).await;
        };
        let event = if out {
            Event::PlayerSitOut { seat }
        } else {
            Event::PlayerSitIn { seat }
        };
        if let Err(e) = handle.dispatch(event).await {
            log::debug!("[bridge] sit toggle rejected on {}: {}", room_id, e);
            self.reply(socket, Message::error(e.code(), e.to_string()));
            self.resync(session_id, socket).await;
        }
    }

    // ------------------------------------------------------------------
    // actions
    // ------------------------------------------------------------------
    async fn on_action(
        &self,
        session_id: &str,
        socket: &Socket,
        action: ActionKind,
        amount: Option<Chips>,
    ) {
        if action.needs_amount() && amount.filter(|a| *a > 0).is_none() {
            self.reply(socket, Message::error("ILLEGAL_AMOUNT", "amount required"));
            return self.resync(session_id, socket).await;
        }
        let Some((handle, room_id, seat)) = self.seated_context(session_id).await else {
            self.reply(socket, Message::error("COMMAND_FAILED", "not seated"));
            return self.resync(session_id, socket).await;
        };
        let action = match (action, amount) {
            (ActionKind::Fold, _) => Action::Fold,
            (ActionKind::Check, _) => Action::Check,
            (ActionKind::Call, _) => Action::Call,
            (ActionKind::Bet, Some(amount)) => Action::Bet { amount },
            (ActionKind::Raise, Some(amount)) => Action::Raise { amount },
            (ActionKind::AllIn, _) => Action::AllIn,
            _ => unreachable!("amount presence checked above"),
        };
        if let Err(e) = handle.dispatch(Event::Action { seat, action }).await {
            log::debug!("[bridge] action rejected on {}: {}", room_id, e);
            self.reply(socket, Message::error(e.code(), e.to_string()));
            self.resync(session_id, socket).await;
        }
    }

    /// Room handle plus self-healed seat for the caller, if seated.
    async fn seated_context(&self, session_id: &str) -> Option<(RoomHandle, String, Position)> {
        let record = self.sessions().get(session_id).await?;
        let room_id = record.room_id.clone()?;
        let handle = self.room(&room_id).await?;
        let pid = self.viewer_id(session_id).await;
        let seat = self.resolve_seat(&handle, &room_id, &pid, session_id).await?;
        Some((handle, room_id, seat))
    }

    /// Self-healing seat resolution: registry first, then the engine's
    /// own seats (repairing the registry), then the raw session id in
    /// case the seat predates an ATTACH (repaired to the canonical id).
    async fn resolve_seat(
        &self,
        handle: &RoomHandle,
        room_id: &str,
        pid: &str,
        session_id: &str,
    ) -> Option<Position> {
        if let Some(seat) = self.registry().seat_of(room_id, pid).await {
            return Some(seat);
        }
        let table = handle.snapshot().await?;
        if let Some(seat) = table.seat_of(pid) {
            let pos = seat.id();
            log::info!("[bridge] repaired seat map for {} on {}", pid, room_id);
            self.registry().set(room_id, pid, pos).await;
            return Some(pos);
        }
        let raw = canonical(session_id);
        if let Some(seat) = table.seat_of(&raw) {
            let pos = seat.id();
            log::info!("[bridge] repaired seat map for {} (was {}) on {}", pid, raw, room_id);
            self.registry().set(room_id, pid, pos).await;
            return Some(pos);
        }
        None
    }

    // ------------------------------------------------------------------
    // identity
    // ------------------------------------------------------------------
    async fn on_attach(&self, session_id: &str, socket: &Socket, user_id: String) {
        match self.sessions().bind(session_id, &user_id).await {
            Ok(record) => {
                self.persist_session(session_id).await;
                self.reply(
                    socket,
                    Message::Session {
                        session_id: record.session_id,
                        user_id: record.user_id,
                    },
                );
            }
            Err(e) => {
                log::debug!("[bridge] attach refused for {}: {}", session_id, e);
                self.reply(socket, Message::error("COMMAND_FAILED", e.to_string()));
            }
        }
    }

    async fn on_reattach(&self, session_id: &mut String, socket: &Socket, target: String) {
        if target == *session_id {
            let record = self.sessions().get(session_id).await;
            let user_id = record.and_then(|r| r.user_id);
            return self.reply(
                socket,
                Message::Session { session_id: target, user_id },
            );
        }
        // live session within grace
        let record = match self.sessions().handle_reconnect(&target, socket.clone()).await {
            Some(record) => Some(record),
            // otherwise rebuild from the durable store
            None => self.restore_from_store(&target, socket).await,
        };
        let Some(record) = record else {
            return self.reply(socket, Message::error("COMMAND_FAILED", "unknown session"));
        };
        self.sessions().remove(session_id).await;
        *session_id = record.session_id.clone();
        self.reply(
            socket,
            Message::Session {
                session_id: record.session_id.clone(),
                user_id: record.user_id.clone(),
            },
        );
        // engine state is untouched; the viewer just needs a resync
        self.resync(session_id, socket).await;
        log::info!("[bridge] session {} reattached", session_id);
    }

    async fn restore_from_store(&self, target: &str, socket: &Socket) -> Option<SessionRecord> {
        let key = format!("{}{}", SESSION_PREFIX, target);
        let json = self.store().get(&key).await.ok()??;
        let record = serde_json::from_str::<SessionRecord>(&json).ok()?;
        self.sessions().restore(record, socket.clone()).await.ok()
    }

    async fn viewer_id(&self, session_id: &str) -> String {
        match self.sessions().get(session_id).await {
            Some(record) => record.canonical_id(),
            None => canonical(session_id),
        }
    }

    /// Awaited on purpose: reconnects depend on the persisted binding.
    async fn persist_session(&self, session_id: &str) {
        let Some(record) = self.sessions().get(session_id).await else {
            return;
        };
        let key = format!("{}{}", SESSION_PREFIX, record.session_id);
        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("[bridge] session serialization failed: {}", e);
                return;
            }
        };
        if let Err(e) = self.store().set(&key, json).await {
            log::warn!("[bridge] session write failed: {}", e);
        }
    }
}

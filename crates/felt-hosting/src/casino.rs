use super::directory::LobbyTable;
use super::directory::TableSpec;
use super::directory::catalog;
use super::message::Message;
use super::message::now_ms;
use super::snapshot::TableView;
use felt_core::Config;
use felt_core::canonical;
use felt_engine::Emission;
use felt_engine::Engine;
use felt_engine::Event;
use felt_engine::Room;
use felt_engine::RoomHandle;
use felt_engine::Timing;
use felt_session::Registry;
use felt_session::SessionManager;
use felt_session::SessionRecord;
use felt_store::ROOM_PREFIX;
use felt_store::SESSION_PREFIX;
use felt_store::Store;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// Manages every live table and the fan-out of their emissions.
///
/// Rooms are pre-created from the directory at boot and run for the
/// server's lifetime; `CREATE_TABLE` adds dynamic ones beside them. All
/// broadcast traffic funnels through [`Casino::broadcast`], where
/// snapshots are sanitized per viewer before anything reaches a socket.
pub struct Casino {
    config: Config,
    sessions: Arc<SessionManager>,
    registry: Registry,
    store: Arc<dyn Store>,
    rooms: RwLock<HashMap<String, RoomHandle>>,
    specs: RwLock<HashMap<String, TableSpec>>,
    emissions: UnboundedSender<Emission>,
    count: AtomicU64,
}

impl Casino {
    /// Builds the casino, pre-creates the directory tables, and spawns
    /// the fan-out and session-expiry tasks.
    pub async fn boot(config: Config, store: Arc<dyn Store>) -> Arc<Self> {
        let (sessions, expired) = SessionManager::new(config.reconnect_grace);
        let (emissions, emissions_rx) = unbounded_channel();
        let casino = Arc::new(Self {
            config,
            sessions,
            registry: Registry::new(),
            store,
            rooms: RwLock::new(HashMap::new()),
            specs: RwLock::new(HashMap::new()),
            emissions,
            count: AtomicU64::new(1),
        });
        for spec in catalog() {
            casino.open_room(spec).await;
        }
        tokio::spawn(Arc::clone(&casino).fan_out(emissions_rx));
        tokio::spawn(Arc::clone(&casino).reap_expired(expired));
        log::info!("[casino] open with {} tables", casino.rooms.read().await.len());
        casino
    }

    async fn open_room(&self, spec: TableSpec) -> RoomHandle {
        let timing = Timing::from(&self.config);
        let engine = Engine::new(&spec.id, spec.small_blind, spec.big_blind, timing);
        let handle = Room::spawn(engine, self.emissions.clone());
        self.rooms.write().await.insert(spec.id.clone(), handle.clone());
        self.specs.write().await.insert(spec.id.clone(), spec);
        handle
    }

    /// Adds a dynamic table beside the fixed catalog.
    pub async fn create_table(&self, name: &str) -> TableSpec {
        let n = self.count.fetch_add(1, Ordering::Relaxed);
        let spec = TableSpec::new(&format!("custom-{}", n), name, 5, 10, "low");
        self.open_room(spec.clone()).await;
        log::info!("[casino] created table {}", spec.id);
        spec
    }

    pub async fn room(&self, id: &str) -> Option<RoomHandle> {
        self.rooms.read().await.get(id).cloned()
    }
    pub async fn spec(&self, id: &str) -> Option<TableSpec> {
        self.specs.read().await.get(id).cloned()
    }
    pub async fn lobby(&self) -> Vec<LobbyTable> {
        let mut tables = self
            .specs
            .read()
            .await
            .values()
            .map(TableSpec::lobby)
            .collect::<Vec<LobbyTable>>();
        tables.sort_by(|a, b| a.id.cmp(&b.id));
        tables
    }
    pub async fn table_count(&self) -> usize {
        self.rooms.read().await.len()
    }
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    // ------------------------------------------------------------------
    // broadcast fan-out
    // ------------------------------------------------------------------
    async fn fan_out(self: Arc<Self>, mut rx: UnboundedReceiver<Emission>) {
        while let Some(emission) = rx.recv().await {
            self.broadcast(emission).await;
        }
        log::debug!("[casino] fan-out task exiting");
    }

    /// Translates one room emission into wire messages for every viewer
    /// subscribed to that table. Non-snapshot messages go out verbatim;
    /// the snapshot is rebuilt per viewer through the sanitization choke
    /// point.
    async fn broadcast(&self, emission: Emission) {
        let viewers = self.sessions.sessions_in_room(&emission.table_id).await;
        let hand = emission.table.hand_number();
        self.track_hand_membership(&emission, &viewers).await;
        for event in emission.events.iter() {
            if let Some(msg) = Message::encode(event, hand) {
                let frame = msg.to_json();
                for (_, socket) in viewers.iter() {
                    let _ = socket.send(frame.clone());
                }
            }
        }
        let view = TableView::from(&emission.table);
        for (record, socket) in viewers.iter() {
            let viewer = record
                .user_id
                .clone()
                .unwrap_or_else(|| canonical(&record.session_id));
            let msg = Message::TableSnapshot {
                table_id: emission.table_id.clone(),
                table: view.clone().sanitized_for(&viewer),
            };
            let _ = socket.send(msg.to_json());
        }
        self.persist_table(&emission);
    }

    /// Keeps each seated session's `in_active_hand` hint in step with the
    /// hand lifecycle (advisory only; the engine is the authority).
    async fn track_hand_membership(
        &self,
        emission: &Emission,
        viewers: &[(SessionRecord, felt_session::Socket)],
    ) {
        let started = emission.events.iter().any(|e| matches!(e, Event::StartHand { .. }));
        let ended = emission.events.iter().any(|e| matches!(e, Event::HandEnd { .. }));
        if !started && !ended {
            return;
        }
        for (record, _) in viewers.iter().filter(|(r, _)| r.seat.is_some()) {
            let in_hand = started && !ended;
            self.sessions.set_in_hand(&record.session_id, in_hand).await;
        }
    }

    /// Snapshot durability is best-effort: settled hands and seating
    /// changes are written in the background, never awaited.
    fn persist_table(&self, emission: &Emission) {
        let worth_saving = emission.events.iter().any(|e| {
            matches!(
                e,
                Event::HandEnd { .. } | Event::PlayerJoin { .. } | Event::PlayerLeave { .. }
            )
        });
        if !worth_saving {
            return;
        }
        let key = format!("{}{}", ROOM_PREFIX, emission.table_id);
        let json = match serde_json::to_string(&emission.table) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("[casino] snapshot serialization failed: {}", e);
                return;
            }
        };
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.set(&key, json).await {
                log::warn!("[casino] snapshot write failed: {}", e);
            }
        });
    }

    // ------------------------------------------------------------------
    // disconnect and expiry
    // ------------------------------------------------------------------
    /// Transport closed: arm the grace timer and tell the table's other
    /// viewers who went missing.
    pub async fn disconnect(&self, session_id: &str) {
        let record = self.sessions.get(session_id).await;
        self.sessions.handle_disconnect(session_id).await;
        let Some(record) = record else { return };
        let (Some(room_id), Some(seat)) = (record.room_id.clone(), record.seat) else {
            return;
        };
        let pid = record
            .user_id
            .clone()
            .unwrap_or_else(|| canonical(&record.session_id));
        log::info!("[casino] {} disconnected from {} seat {}", pid, room_id, seat);
        let gone = Message::PlayerDisconnected {
            table_id: room_id.clone(),
            seat,
            player_id: pid.clone(),
        }
        .to_json();
        let countdown = Message::CountdownStart {
            countdown_type: felt_engine::CountdownKind::Reconnect,
            start_time: now_ms(),
            duration_ms: self.config.reconnect_grace.as_millis() as u64,
            metadata: json!({ "seat": seat, "playerId": pid }),
        }
        .to_json();
        for (_, socket) in self.sessions.sessions_in_room(&room_id).await {
            let _ = socket.send(gone.clone());
            let _ = socket.send(countdown.clone());
        }
    }

    /// Grace elapsed: the seat is vacated (implicit fold if mid-hand) and
    /// the persisted session dropped.
    async fn reap_expired(self: Arc<Self>, mut rx: UnboundedReceiver<SessionRecord>) {
        while let Some(record) = rx.recv().await {
            if let (Some(room_id), Some(seat)) = (&record.room_id, record.seat) {
                let pid = record
                    .user_id
                    .clone()
                    .unwrap_or_else(|| canonical(&record.session_id));
                if let Some(handle) = self.room(room_id).await {
                    match handle
                        .dispatch(Event::PlayerLeave { seat, pid: pid.clone() })
                        .await
                    {
                        Ok(_) => log::info!("[casino] reclaimed seat {} on {}", seat, room_id),
                        Err(e) => log::debug!("[casino] expiry leave rejected: {}", e),
                    }
                }
                self.registry.remove(room_id, &pid).await;
            }
            let key = format!("{}{}", SESSION_PREFIX, record.session_id);
            if let Err(e) = self.store.del(&key).await {
                log::warn!("[casino] session cleanup failed: {}", e);
            }
        }
    }
}

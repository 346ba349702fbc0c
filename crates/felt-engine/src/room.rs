use super::engine::Engine;
use super::error::EngineError;
use super::event::CountdownKind;
use super::event::Event;
use super::table::Table;
use super::timer::Timers;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::oneshot;

/// Commands accepted by a room task.
#[derive(Debug)]
pub enum RoomCmd {
    Dispatch {
        event: Event,
        reply: oneshot::Sender<Result<Vec<Event>, EngineError>>,
    },
    Snapshot {
        reply: oneshot::Sender<Table>,
    },
}

/// What a room publishes after every state change: the applied events and
/// a full post-state snapshot for fan-out and persistence.
#[derive(Debug, Clone)]
pub struct Emission {
    pub table_id: String,
    pub events: Vec<Event>,
    pub table: Table,
}

/// Client half of a room: enqueue work, await the serialized result.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    id: String,
    tx: UnboundedSender<RoomCmd>,
}

impl RoomHandle {
    pub fn id(&self) -> &str {
        &self.id
    }
    /// Dispatches an event and suspends until it (and everything derived
    /// from it) has been applied and published.
    pub async fn dispatch(&self, event: Event) -> Result<Vec<Event>, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(RoomCmd::Dispatch { event, reply })
            .map_err(|_| EngineError::Invariant("room task gone".into()))?;
        rx.await
            .map_err(|_| EngineError::Invariant("room task gone".into()))?
    }
    /// Fresh full-state snapshot.
    pub async fn snapshot(&self) -> Option<Table> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(RoomCmd::Snapshot { reply }).ok()?;
        rx.await.ok()
    }
}

/// Single-writer event loop owning one table's engine and timer wheel.
///
/// All mutations of the table come through this task's queue, which gives
/// the per-table total order the event log records. Timer expiries are
/// injected between queued commands, never concurrently with them.
pub struct Room {
    engine: Engine,
    timers: Timers,
    rx: UnboundedReceiver<RoomCmd>,
    emissions: UnboundedSender<Emission>,
}

impl Room {
    pub fn spawn(engine: Engine, emissions: UnboundedSender<Emission>) -> RoomHandle {
        let (tx, rx) = unbounded_channel();
        let id = engine.table().id().to_string();
        let room = Self {
            engine,
            timers: Timers::new(),
            rx,
            emissions,
        };
        tokio::spawn(room.run());
        RoomHandle { id, tx }
    }

    async fn run(mut self) {
        let id = self.engine.table().id().to_string();
        log::debug!("[room {}] task started", id);
        loop {
            let deadline = self.timers.next_deadline();
            tokio::select! {
                biased;
                cmd = self.rx.recv() => match cmd {
                    Some(RoomCmd::Dispatch { event, reply }) => {
                        let result = self.engine.dispatch(event);
                        self.reconcile(&result);
                        let _ = reply.send(result);
                    }
                    Some(RoomCmd::Snapshot { reply }) => {
                        let _ = reply.send(self.engine.table().clone());
                    }
                    None => break,
                },
                _ = async {
                    match deadline {
                        Some(at) => tokio::time::sleep_until(at).await,
                        None => std::future::pending::<()>().await,
                    }
                } => {
                    for kind in self.timers.take_expired() {
                        let result = self.engine.expire(kind);
                        match &result {
                            Err(e) if e.is_stale() => {
                                log::trace!("[room {}] stale {:?} expiry", id, kind)
                            }
                            Err(EngineError::NotEnoughPlayers) => {
                                log::debug!("[room {}] waiting for players", id)
                            }
                            Err(e) => log::warn!("[room {}] {:?} expiry failed: {}", id, kind, e),
                            Ok(_) => {}
                        }
                        self.reconcile(&result);
                    }
                }
            }
        }
        log::debug!("[room {}] task exiting", id);
    }

    /// Post-dispatch bookkeeping: timer arming from emitted countdowns,
    /// cancellation of consumed ones, and publication of the batch.
    fn reconcile(&mut self, result: &Result<Vec<Event>, EngineError>) {
        match result {
            Ok(events) if events.is_empty() => {}
            Ok(events) => {
                let consumed_action = events.iter().any(|e| {
                    matches!(
                        e,
                        Event::Action { .. } | Event::ActionTimeout { .. } | Event::HandEnd { .. }
                    )
                });
                if consumed_action {
                    self.timers.clear(CountdownKind::Action);
                }
                for event in events.iter() {
                    if let Event::CountdownStart { countdown, duration_ms, .. } = event {
                        self.timers.arm(*countdown, Duration::from_millis(*duration_ms));
                    }
                }
                self.publish(events.clone());
            }
            Err(EngineError::Invariant(_)) => {
                // table was quarantined: void timers, resync viewers
                self.timers.clear_all();
                self.publish(Vec::new());
            }
            Err(_) => {}
        }
    }

    fn publish(&mut self, events: Vec<Event>) {
        let table = self.engine.table().clone();
        let emission = Emission {
            table_id: table.id().to_string(),
            events,
            table,
        };
        if self.emissions.send(emission).is_err() {
            log::warn!("[room {}] emission channel closed", self.engine.table().id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Timing;
    use crate::phase::Phase;

    fn join(seat: felt_core::Position) -> Event {
        Event::PlayerJoin {
            seat,
            pid: format!("p{}", seat),
            nickname: format!("P{}", seat),
            chips: 1000,
        }
    }

    #[tokio::test]
    async fn dispatch_returns_applied_events_and_publishes() {
        let (tx, mut rx) = unbounded_channel();
        let engine = Engine::new("t", 5, 10, Timing::default());
        let handle = Room::spawn(engine, tx);
        let events = handle.dispatch(join(0)).await.unwrap();
        assert!(matches!(events[0], Event::PlayerJoin { seat: 0, .. }));
        let emission = rx.recv().await.unwrap();
        assert_eq!(emission.table_id, "t");
        assert!(emission.table.seat(0).is_occupied());
    }

    #[tokio::test]
    async fn rejections_leave_no_emission() {
        let (tx, mut rx) = unbounded_channel();
        let engine = Engine::new("t", 5, 10, Timing::default());
        let handle = Room::spawn(engine, tx);
        handle.dispatch(join(0)).await.unwrap();
        let err = handle.dispatch(join(0)).await.unwrap_err();
        assert_eq!(err, EngineError::SeatOccupied(0));
        let first = rx.recv().await.unwrap();
        assert_eq!(first.events.len(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn new_hand_timer_starts_the_hand() {
        let (tx, mut rx) = unbounded_channel();
        let engine = Engine::new("t", 5, 10, Timing::default());
        let handle = Room::spawn(engine, tx);
        handle.dispatch(join(0)).await.unwrap();
        handle.dispatch(join(1)).await.unwrap();
        // the second join armed the new-hand countdown; let it fire
        loop {
            let emission = rx.recv().await.unwrap();
            if emission.events.iter().any(|e| matches!(e, Event::StartHand { .. })) {
                assert_eq!(emission.table.phase(), Phase::Preflop);
                break;
            }
        }
        let table = handle.snapshot().await.unwrap();
        assert_eq!(table.hand_number(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn action_timer_folds_the_absent_actor() {
        let (tx, mut rx) = unbounded_channel();
        let engine = Engine::new("t", 5, 10, Timing::default());
        let handle = Room::spawn(engine, tx);
        handle.dispatch(join(0)).await.unwrap();
        handle.dispatch(join(1)).await.unwrap();
        loop {
            let emission = rx.recv().await.unwrap();
            if emission
                .events
                .iter()
                .any(|e| matches!(e, Event::ActionTimeout { .. }))
            {
                // preflop walk: the timed-out opener folds, hand settles
                assert!(emission.events.iter().any(|e| matches!(e, Event::HandEnd { .. })));
                assert_eq!(emission.table.phase(), Phase::Waiting);
                break;
            }
        }
    }
}

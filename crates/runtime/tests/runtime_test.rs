use std::sync::{Arc, Mutex};
use std::time::Duration;

use autocast_core::{
    ActorState, CapabilityId, CapabilityState, CapabilityTarget, CommandEvent, CommandIssuer,
    CommandKind, CommandListener, ControllerEvent, EntityId, EntityStatus, GameTime, IssueError,
    OrderKind, Position, RestoreSlot, Targeting, WorldView,
};
use autocast_runtime::{Runtime, RuntimeConfig, RuntimeError, Topic};

const HERO: EntityId = EntityId(1);

/// Orders the host accepted, shared with the test after the host moved
/// into the worker.
#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct TestHost {
    journal: Journal,
    ward: CapabilityState,
    listener: Option<CommandListener>,
}

impl TestHost {
    fn new(journal: Journal) -> Self {
        Self {
            journal,
            ward: CapabilityState {
                id: CapabilityId::new("venomancer_plague_ward"),
                level: 2,
                is_ready: true,
                is_casting: false,
                cooldown_remaining: Duration::ZERO,
                cost: 30.0,
                targeting: Targeting::SelfTarget,
            },
            listener: None,
        }
    }

    fn echo(&self, event: CommandEvent) {
        if let Some(listener) = &self.listener {
            // Script orders reported as user input must still be rejected.
            let _ = listener.on_command(&event, GameTime::ZERO, Some(HERO));
        }
    }
}

impl WorldView for TestHost {
    fn controlled_actor(&self) -> Option<ActorState> {
        Some(ActorState {
            id: HERO,
            kind: "npc_dota_hero_venomancer".into(),
            is_valid: true,
            is_alive: true,
            is_invisible: false,
            resource: 400.0,
            position: Position::ORIGIN,
        })
    }

    fn capabilities(&self, _actor: EntityId) -> Vec<CapabilityState> {
        vec![self.ward.clone()]
    }

    fn entity_status(&self, _entity: EntityId) -> EntityStatus {
        EntityStatus::VISIBLE
    }
}

impl CommandIssuer for TestHost {
    fn move_to_point(
        &mut self,
        actor: EntityId,
        position: Position,
        queue: bool,
    ) -> Result<(), IssueError> {
        self.journal.push(format!("move {} {}", position, queue));
        self.echo(CommandEvent::user(OrderKind::MoveToPosition, actor).with_position(position));
        Ok(())
    }

    fn attack_move(
        &mut self,
        _actor: EntityId,
        position: Position,
        _queue: bool,
    ) -> Result<(), IssueError> {
        self.journal.push(format!("attack-move {}", position));
        Ok(())
    }

    fn attack_target(
        &mut self,
        _actor: EntityId,
        target: EntityId,
        _queue: bool,
    ) -> Result<(), IssueError> {
        self.journal.push(format!("attack {}", target));
        Ok(())
    }

    fn move_to_target(
        &mut self,
        _actor: EntityId,
        target: EntityId,
        _queue: bool,
    ) -> Result<(), IssueError> {
        self.journal.push(format!("follow {}", target));
        Ok(())
    }

    fn use_capability(
        &mut self,
        _actor: EntityId,
        capability: &CapabilityId,
        _target: CapabilityTarget,
    ) -> Result<(), IssueError> {
        self.journal.push(format!("use {}", capability));
        self.ward.cooldown_remaining = Duration::from_secs(6);
        self.ward.is_ready = false;
        Ok(())
    }
}

fn t(millis: i64) -> GameTime {
    GameTime::from_millis(millis)
}

#[tokio::test]
async fn build_requires_host() {
    let result = Runtime::builder().build().await;
    assert!(matches!(result, Err(RuntimeError::MissingHost)));
}

#[tokio::test]
async fn build_rejects_invalid_controller_config() {
    let mut config = RuntimeConfig::default();
    config.controller.restore_delays.clear();

    let result = Runtime::builder()
        .config(config)
        .host(TestHost::new(Journal::default()))
        .build()
        .await;

    assert!(matches!(result, Err(RuntimeError::InvalidConfig(_))));
}

#[tokio::test]
async fn drives_a_full_cycle_through_the_worker() {
    let journal = Journal::default();
    let runtime = Runtime::builder()
        .host(TestHost::new(journal.clone()))
        .build()
        .await
        .expect("runtime should build");
    let handle = runtime.handle();
    let mut restorations = runtime.subscribe(Topic::Restoration);

    handle.start_session(t(-1_000)).await.unwrap();
    let captured = handle
        .observe(
            CommandEvent::user(OrderKind::MoveToPosition, HERO)
                .with_position(Position::new(64.0, 32.0, 0.0)),
            t(-100),
        )
        .await
        .unwrap();
    assert_eq!(
        captured,
        ControllerEvent::CommandCaptured {
            kind: CommandKind::MoveToPoint
        }
    );

    assert_eq!(
        handle.tick(t(0)).await.unwrap(),
        vec![ControllerEvent::Triggered { cycle: 1 }]
    );
    assert_eq!(
        handle.tick(t(10)).await.unwrap(),
        vec![ControllerEvent::ActionIssued {
            cycle: 1,
            capability: CapabilityId::new("venomancer_plague_ward"),
        }]
    );
    handle.tick(t(510)).await.unwrap();

    let event = restorations.recv().await.expect("restoration event");
    assert_eq!(event.at, t(510));
    assert_eq!(
        event.event,
        ControllerEvent::RestorationDispatched {
            slot: RestoreSlot {
                cycle: 1,
                attempt: 1
            },
            kind: CommandKind::MoveToPoint,
        }
    );
    assert_eq!(
        journal.entries(),
        vec![
            "use venomancer_plague_ward".to_string(),
            "move (64.0, 32.0, 0.0) false".to_string(),
        ]
    );

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn toggles_and_session_are_reflected_in_status() {
    let runtime = Runtime::builder()
        .host(TestHost::new(Journal::default()))
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    handle.start_session(t(0)).await.unwrap();
    handle.set_enabled(false).await.unwrap();
    handle.set_restore_enabled(false).await.unwrap();
    assert!(handle.tick(t(0)).await.unwrap().is_empty());

    let status = handle.status().await.unwrap();
    assert!(status.session_active);
    assert!(!status.enabled);
    assert!(!status.restore_enabled);
    assert_eq!(status.cycles_triggered, 0);

    handle.end_session().await.unwrap();
    assert!(!handle.status().await.unwrap().session_active);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn synchronous_echo_does_not_overwrite_snapshot() {
    let runtime = Runtime::builder()
        .host_with_listener(|listener| {
            let mut host = TestHost::new(Journal::default());
            host.listener = Some(listener);
            host
        })
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    handle.start_session(t(-1_000)).await.unwrap();
    handle
        .observe(
            CommandEvent::user(OrderKind::MoveToPosition, HERO)
                .with_position(Position::new(1.0, 2.0, 0.0)),
            t(-50),
        )
        .await
        .unwrap();
    for now in [0, 10, 510] {
        handle.tick(t(now)).await.unwrap();
    }

    let status = handle.status().await.unwrap();
    let primary = status.primary.expect("snapshot kept");
    assert_eq!(primary.captured_at(), t(-50));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn handle_fails_after_shutdown() {
    let runtime = Runtime::builder()
        .host(TestHost::new(Journal::default()))
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    runtime.shutdown().await.unwrap();

    assert!(matches!(
        handle.tick(t(0)).await,
        Err(RuntimeError::CommandChannelClosed)
    ));
}

//! Queue/pacing controller
//!
//! Submissions land in the round's queue straight away; a single worker
//! task owns the AI engine and walks one piece at a time through thinking,
//! the drop animation and the line clear. The round lives behind a std
//! mutex that is only ever held between suspension points, so a piece's
//! pipeline is never interleaved with another's. Every step publishes a
//! fresh `Snapshot` on a watch channel.

use crate::ai::AiEngine;
use crate::audio::{Sfx, SoundSink};
use crate::difficulty::Difficulty;
use crate::error::Rejection;
use crate::game::{Job, Round};
use crate::settings::{PacingSettings, Settings};
use crate::snapshot::Snapshot;
use crate::tetromino::PieceType;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

struct Shared {
    round: Mutex<Round>,
    wake: Notify,
    shutdown: AtomicBool,
    snapshots: watch::Sender<Snapshot>,
    sound: Arc<dyn SoundSink>,
    muted: bool,
    pacing: PacingSettings,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Round> {
        self.round.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, round: &Round) {
        self.snapshots.send_replace(round.snapshot());
    }

    fn play(&self, sfx: Sfx) {
        if !self.muted {
            self.sound.play(sfx);
        }
    }

    /// Run `f` on the round and publish the result
    fn update<T>(&self, f: impl FnOnce(&mut Round) -> T) -> T {
        let mut round = self.lock();
        let out = f(&mut round);
        self.publish(&round);
        out
    }

    /// Like `update`, but only while the round is still the one `job`
    /// was taken from
    fn update_if<T>(&self, job: &Job, f: impl FnOnce(&mut Round) -> T) -> Option<T> {
        let mut round = self.lock();
        if round.generation() != job.generation {
            return None;
        }
        let out = f(&mut round);
        self.publish(&round);
        Some(out)
    }

    fn next_job(&self) -> Option<Job> {
        self.update(|round| round.next_job(Instant::now()))
    }
}

/// Handle to a running controller; cheap to clone
#[derive(Clone)]
pub struct Controller {
    shared: Arc<Shared>,
}

impl Controller {
    /// Build a round from `settings` and start the worker task on the
    /// current runtime. The round stays `Ready` until `start`
    pub fn spawn(settings: &Settings, sound: Arc<dyn SoundSink>) -> (Self, JoinHandle<()>) {
        let round = Round::new(
            settings.gameplay.difficulty,
            settings.gameplay.mode,
            &settings.pacing,
        );
        Self::from_round(round, settings, sound)
    }

    pub(crate) fn from_round(
        round: Round,
        settings: &Settings,
        sound: Arc<dyn SoundSink>,
    ) -> (Self, JoinHandle<()>) {
        let (snapshots, _) = watch::channel(round.snapshot());
        let shared = Arc::new(Shared {
            round: Mutex::new(round),
            wake: Notify::new(),
            shutdown: AtomicBool::new(false),
            snapshots,
            sound,
            muted: settings.preferences.muted,
            pacing: settings.pacing.clone(),
        });

        let engine = AiEngine::new(&settings.ai);
        let worker = tokio::spawn(run_worker(shared.clone(), engine));
        // Pick up anything already queued in an injected round
        shared.wake.notify_one();

        (Self { shared }, worker)
    }

    pub fn start(&self) -> bool {
        let started = self.shared.update(Round::start);
        if started {
            info!("Round started");
        }
        started
    }

    /// Queue a piece for the AI
    pub fn submit_piece(&self, kind: PieceType) -> Result<(), Rejection> {
        let result = self.shared.update(|round| round.submit(kind, Instant::now()));
        match result {
            Ok(()) => {
                debug!("Queued {}", kind);
                self.shared.wake.notify_one();
            }
            Err(rejection) => {
                debug!("Rejected {}: {}", kind, rejection);
                self.shared.play(Sfx::Rejected);
            }
        }
        result
    }

    /// `submit_piece` reduced to accepted / rejected
    pub fn submit(&self, kind: PieceType) -> bool {
        self.submit_piece(kind).is_ok()
    }

    pub fn pause(&self) -> bool {
        let paused = self.shared.update(Round::pause);
        if paused {
            info!("Round paused");
        }
        paused
    }

    pub fn resume(&self) -> bool {
        let resumed = self.shared.update(Round::resume);
        if resumed {
            info!("Round resumed");
            self.shared.wake.notify_one();
        }
        resumed
    }

    pub fn set_difficulty(&self, difficulty: Difficulty) -> Result<(), Rejection> {
        let result = self.shared.update(|round| round.set_difficulty(difficulty));
        match &result {
            Ok(()) => info!("Difficulty set to {}", difficulty),
            Err(rejection) => warn!("Difficulty change to {} refused: {}", difficulty, rejection),
        }
        result
    }

    /// Throw the round away and start a fresh one; a piece in flight is
    /// abandoned at its next suspension point
    pub fn reset(&self) {
        self.shared.update(Round::reset);
        info!("Round reset");
    }

    /// Restart in countdown mode at `difficulty`
    pub fn start_countdown(&self, difficulty: Difficulty) {
        self.shared.update(|round| round.start_countdown(difficulty));
        info!("Countdown round started at {}", difficulty);
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.snapshots.borrow().clone()
    }

    /// Receiver for every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.snapshots.subscribe()
    }

    /// Wait until the worker is idle with nothing it can dequeue
    pub async fn settled(&self) -> Snapshot {
        let mut rx = self.subscribe();
        match rx.wait_for(Snapshot::is_settled).await {
            Ok(snapshot) => snapshot.clone(),
            // Sender is owned by `shared`
            Err(_) => self.snapshot(),
        }
    }

    /// Stop the worker once its current piece resolves
    pub fn shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.wake.notify_one();
    }
}

async fn run_worker(shared: Arc<Shared>, mut engine: AiEngine) {
    debug!("Controller worker started");
    'worker: loop {
        shared.wake.notified().await;
        if shared.shutdown.load(Ordering::SeqCst) {
            break;
        }
        while let Some(job) = shared.next_job() {
            process(&shared, &mut engine, job).await;
            if shared.shutdown.load(Ordering::SeqCst) {
                break 'worker;
            }
        }
    }
    debug!("Controller worker stopped");
}

/// Full pipeline for one piece: think, drop, lock, clear, top-out check
async fn process(shared: &Shared, engine: &mut AiEngine, job: Job) {
    let decision = engine
        .select_move(&job.grid, job.kind, &job.profile, job.multiplier)
        .await;

    let Some(mv) = decision.best else {
        if shared.update_if(&job, Round::end_round).is_some() {
            end_round(shared, &job, "no legal placement");
        }
        return;
    };

    if shared.update_if(&job, |round| round.begin_drop(&mv)).is_none() {
        return;
    }

    let step = shared.pacing.drop_step(job.multiplier);
    for _ in 0..mv.y {
        sleep(step).await;
        if shared.update_if(&job, Round::advance_drop).is_none() {
            return;
        }
    }

    let Some(lines) = shared.update_if(&job, Round::lock_active) else {
        return;
    };
    shared.play(Sfx::Lock);

    if !lines.is_empty() {
        let boosted = shared.lock().boost.active;
        sleep(shared.pacing.line_clear_delay(boosted, job.multiplier)).await;
        let Some(clear) = shared.update_if(&job, Round::clear_highlighted) else {
            return;
        };
        if let Some(clear) = clear {
            info!("{} ({} lines) with {}", clear.name, clear.lines, job.kind);
            if let Some(sfx) = Sfx::for_lines(clear.lines) {
                shared.play(sfx);
            }
        }
    }

    let topped_out = shared.update_if(&job, |round| {
        if round.grid.is_top_out() {
            round.end_round();
            true
        } else {
            round.finish_piece();
            false
        }
    });
    if topped_out == Some(true) {
        end_round(shared, &job, "stack reached the top");
    }
}

fn end_round(shared: &Shared, job: &Job, reason: &str) {
    let round = shared.lock();
    info!(
        "Game over after {} ({}): score {}, lines {}, pieces {}",
        job.kind, reason, round.stats.score, round.stats.lines_cleared, round.stats.pieces_sent
    );
    drop(round);
    shared.play(Sfx::GameOver);
}

use super::{PromptError, PromptSource};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;

pub const FETCHING_STATUS: &str = "Getting a prompt…";
pub const FAILED_STATUS: &str = "Could not get a prompt. Try again.";
pub const BANNER_ALPHA_STEP: u8 = 10;
pub const BANNER_ALPHA_MAX: u8 = 180;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameState {
    Idle,
    Fetching,
    Active { prompt: String },
    Failed { message: String },
}

type FetchResult = (u64, Result<String, PromptError>);

/// Presentation state of the prompt game. Never touches the canvas.
pub struct PromptGame {
    source: Arc<dyn PromptSource>,
    state: GameState,
    generation: u64,
    banner_alpha: u8,
    tx: Sender<FetchResult>,
    rx: Receiver<FetchResult>,
    #[cfg(test)]
    stale_dropped: usize,
}

impl PromptGame {
    pub fn new(source: Arc<dyn PromptSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            state: GameState::Idle,
            generation: 0,
            banner_alpha: 0,
            tx,
            rx,
            #[cfg(test)]
            stale_dropped: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_fetching(&self) -> bool {
        self.state == GameState::Fetching
    }

    pub fn prompt(&self) -> Option<&str> {
        match &self.state {
            GameState::Active { prompt } => Some(prompt),
            _ => None,
        }
    }

    /// Text for the status line; empty while idle.
    pub fn status(&self) -> String {
        match &self.state {
            GameState::Idle => String::new(),
            GameState::Fetching => FETCHING_STATUS.to_string(),
            GameState::Active { prompt } => format!("Prompt: {prompt}"),
            GameState::Failed { message } => message.clone(),
        }
    }

    pub fn banner_alpha(&self) -> u8 {
        self.banner_alpha
    }

    /// Requests a fresh prompt. Any request still in flight is superseded.
    pub fn start(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        self.state = GameState::Fetching;

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let spawned = std::thread::Builder::new()
            .name("prompt-fetch".into())
            .spawn(move || {
                let result = source.fetch_prompt();
                // The game may have been dropped meanwhile.
                let _ = tx.send((generation, result));
            });
        if let Err(err) = spawned {
            tracing::error!(error = %err, "failed to spawn prompt fetch thread");
            self.state = GameState::Failed {
                message: FAILED_STATUS.to_string(),
            };
        }
    }

    /// Drains finished fetches. Call once per frame. Returns `true` if the state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            let (generation, result) = match self.rx.try_recv() {
                Ok(message) => message,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            };
            if generation != self.generation || self.state != GameState::Fetching {
                tracing::debug!(generation, current = self.generation, "dropping stale prompt");
                #[cfg(test)]
                {
                    self.stale_dropped += 1;
                }
                continue;
            }
            match result {
                Ok(prompt) => {
                    tracing::info!(%prompt, "prompt received");
                    self.state = GameState::Active { prompt };
                    self.banner_alpha = 0;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "prompt fetch failed");
                    self.state = GameState::Failed {
                        message: FAILED_STATUS.to_string(),
                    };
                }
            }
            changed = true;
        }
        changed
    }

    /// Clears the prompt and status. A fetch in flight is ignored when it lands.
    pub fn stop(&mut self) {
        self.generation += 1;
        self.state = GameState::Idle;
        self.banner_alpha = 0;
    }

    /// Fades the banner in while a prompt is active.
    pub fn tick_banner(&mut self) {
        if matches!(self.state, GameState::Active { .. }) {
            self.banner_alpha = self
                .banner_alpha
                .saturating_add(BANNER_ALPHA_STEP)
                .min(BANNER_ALPHA_MAX);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    struct FixedSource(Result<&'static str, ()>);

    impl PromptSource for FixedSource {
        fn fetch_prompt(&self) -> Result<String, PromptError> {
            self.0
                .map(str::to_string)
                .map_err(|_| PromptError::MissingPrompt)
        }
    }

    /// First call blocks until released and answers "Cat"; later calls answer "Dog".
    struct GatedSource {
        calls: AtomicUsize,
        gate: Mutex<Receiver<()>>,
    }

    impl PromptSource for GatedSource {
        fn fetch_prompt(&self) -> Result<String, PromptError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                let gate = self.gate.lock().expect("gate lock");
                let _ = gate.recv();
                return Ok("Cat".into());
            }
            Ok("Dog".into())
        }
    }

    fn poll_until(game: &mut PromptGame, done: impl Fn(&PromptGame) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(game) {
            assert!(Instant::now() < deadline, "timed out waiting for prompt game");
            let _ = game.poll();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn successful_fetch_activates_the_prompt() {
        let mut game = PromptGame::new(Arc::new(FixedSource(Ok("Bicycle"))));
        assert_eq!(game.status(), "");

        game.start();
        assert_eq!(game.status(), FETCHING_STATUS);
        poll_until(&mut game, |g| !g.is_fetching());

        assert_eq!(game.prompt(), Some("Bicycle"));
        assert_eq!(game.status(), "Prompt: Bicycle");
        assert_eq!(game.banner_alpha(), 0);
    }

    #[test]
    fn failed_fetch_reports_passively() {
        let mut game = PromptGame::new(Arc::new(FixedSource(Err(()))));
        game.start();
        poll_until(&mut game, |g| !g.is_fetching());

        assert_eq!(
            game.state(),
            &GameState::Failed {
                message: FAILED_STATUS.into()
            }
        );
        assert_eq!(game.prompt(), None);
    }

    #[test]
    fn banner_fades_in_and_caps() {
        let mut game = PromptGame::new(Arc::new(FixedSource(Ok("Tree"))));
        game.tick_banner();
        assert_eq!(game.banner_alpha(), 0);

        game.start();
        poll_until(&mut game, |g| g.prompt().is_some());
        game.tick_banner();
        assert_eq!(game.banner_alpha(), 10);
        for _ in 0..40 {
            game.tick_banner();
        }
        assert_eq!(game.banner_alpha(), BANNER_ALPHA_MAX);

        game.stop();
        assert_eq!(game.state(), &GameState::Idle);
        assert_eq!(game.banner_alpha(), 0);
        assert_eq!(game.status(), "");
    }

    #[test]
    fn restart_ignores_the_superseded_result() {
        let (release, gate) = mpsc::channel();
        let source = Arc::new(GatedSource {
            calls: AtomicUsize::new(0),
            gate: Mutex::new(gate),
        });
        let mut game = PromptGame::new(source.clone());

        game.start();
        let deadline = Instant::now() + Duration::from_secs(5);
        while source.calls.load(Ordering::SeqCst) == 0 {
            assert!(Instant::now() < deadline, "first fetch never started");
            std::thread::sleep(Duration::from_millis(5));
        }
        game.start();
        poll_until(&mut game, |g| g.prompt().is_some());
        assert_eq!(game.prompt(), Some("Dog"));

        release.send(()).expect("release first fetch");
        poll_until(&mut game, |g| g.stale_dropped == 1);
        assert_eq!(game.prompt(), Some("Dog"));
    }

    #[test]
    fn stop_ignores_a_late_result() {
        let (release, gate) = mpsc::channel();
        let mut game = PromptGame::new(Arc::new(GatedSource {
            calls: AtomicUsize::new(0),
            gate: Mutex::new(gate),
        }));

        game.start();
        game.stop();
        release.send(()).expect("release fetch");
        poll_until(&mut game, |g| g.stale_dropped == 1);
        assert_eq!(game.state(), &GameState::Idle);
    }
}

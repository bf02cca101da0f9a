use std::time::{Duration, Instant};

/// Leading-edge throttle: the first call in a window runs immediately and
/// every other call inside that window is dropped.
pub struct Throttle<F> {
    func: F,
    window: Duration,
    window_opened_at: Option<Instant>,
}

impl<F> Throttle<F> {
    pub fn new(window: Duration, func: F) -> Self {
        Self {
            func,
            window,
            window_opened_at: None,
        }
    }

    pub fn call<A, R>(&mut self, now: Instant, args: A) -> Option<R>
    where
        F: FnMut(A) -> R,
    {
        if let Some(opened_at) = self.window_opened_at
            && now.saturating_duration_since(opened_at) < self.window
        {
            return None;
        }

        self.window_opened_at = Some(now);
        Some((self.func)(args))
    }

    pub fn reset(&mut self) {
        self.window_opened_at = None;
    }
}

/// Trailing-edge debounce: every call pushes the deadline back, and the
/// function runs once with the arguments of the last call.
pub struct Debounce<F, A> {
    func: F,
    wait: Duration,
    pending: Option<(Instant, A)>,
}

impl<F, A> Debounce<F, A> {
    pub fn new(wait: Duration, func: F) -> Self {
        Self {
            func,
            wait,
            pending: None,
        }
    }

    pub fn call(&mut self, now: Instant, args: A) {
        self.pending = Some((now + self.wait, args));
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn poll<R>(&mut self, now: Instant) -> Option<R>
    where
        F: FnMut(A) -> R,
    {
        match self.pending.take() {
            Some((deadline, args)) if deadline <= now => Some((self.func)(args)),
            pending => {
                self.pending = pending;
                None
            }
        }
    }
}

// Cancelable deferred task owned by the controller that schedules it.
//
// The controller keeps the deadline; the host only arms a real timer and
// hands the `TaskHandle` back when it fires. A handle from a canceled or
// superseded schedule is rejected, so a stale timer can never run.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskHandle {
    generation: u64,
}

#[derive(Debug, Default, Clone)]
pub struct DeferredTask {
    deadline_ms: Option<f64>,
    generation: u64,
}

impl DeferredTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the task, superseding any pending schedule.
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64) -> TaskHandle {
        self.generation += 1;
        self.deadline_ms = Some(now_ms + delay_ms.max(0.0));
        TaskHandle {
            generation: self.generation,
        }
    }

    pub fn cancel(&mut self) {
        if self.deadline_ms.take().is_some() {
            self.generation += 1;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Consumes the pending schedule if `handle` still refers to it.
    pub fn fire(&mut self, handle: TaskHandle) -> bool {
        if self.deadline_ms.is_some() && handle.generation == self.generation {
            self.deadline_ms = None;
            true
        } else {
            false
        }
    }

    /// Consumes the pending schedule if its deadline has passed.
    pub fn fire_due(&mut self, now_ms: f64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_with_current_handle() {
        let mut task = DeferredTask::new();
        let h = task.schedule(0.0, 100.0);
        assert!(task.is_pending());
        assert!(task.fire(h));
        assert!(!task.fire(h));
        assert!(!task.is_pending());
    }

    #[test]
    fn canceled_or_superseded_handles_never_fire() {
        let mut task = DeferredTask::new();
        let first = task.schedule(0.0, 100.0);
        let second = task.schedule(10.0, 100.0);
        assert!(!task.fire(first));
        task.cancel();
        assert!(!task.fire(second));
        assert!(!task.fire_due(1_000.0));
    }

    #[test]
    fn fire_due_respects_deadline() {
        let mut task = DeferredTask::new();
        task.schedule(50.0, 100.0);
        assert!(!task.fire_due(149.0));
        assert!(task.fire_due(150.0));
        assert!(!task.fire_due(151.0));
    }
}

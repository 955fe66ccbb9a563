//! Cross-thread task queue.
//!
//! GPU handles are thread-affine: only the owning (graphics) thread may touch
//! them. Background workers, such as the parallel cubemap face decoders, hand
//! their results over by submitting closures here; the owning thread runs
//! everything queued once per tick via [`TaskQueue::drain`].
//!
//! Submission is channel-based. A plain [`TaskSender::submit`] is fire-and-forget;
//! [`TaskSender::submit_tracked`] additionally returns a [`TaskHandle`] whose
//! [`wait`](TaskHandle::wait) blocks until the task has actually run. Because the
//! block happens at the `wait` call rather than inside `submit`, the owning
//! thread can submit, drain, and then wait without deadlocking itself. Waiting
//! on the owning thread *before* draining still blocks forever; that remains a
//! caller hazard.

use crate::error::{PathlightError, Result};
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};

type Action = Box<dyn FnOnce() + Send + 'static>;

struct Task {
    action: Action,
    done: Option<Sender<()>>,
}

/// Owning-thread end of the queue. Create once, keep on the graphics thread,
/// hand out [`TaskSender`]s to workers.
pub struct TaskQueue {
    sender: Sender<Task>,
    receiver: Receiver<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// A cloneable, `Send` submission handle for background threads.
    pub fn sender(&self) -> TaskSender {
        TaskSender {
            sender: self.sender.clone(),
        }
    }

    /// True when at least one task is pending.
    pub fn has_work(&self) -> bool {
        !self.receiver.is_empty()
    }

    /// Runs every task queued at the time of the call, in FIFO order, and
    /// returns how many ran. Tasks submitted *during* the drain (including
    /// re-submissions from a running task) stay queued for the next tick, so a
    /// self-re-submitting task cannot spin this call forever.
    ///
    /// Must be called from the owning thread only.
    pub fn drain(&self) -> usize {
        let pending = self.receiver.len();
        for _ in 0..pending {
            // len() can only have grown since the snapshot, so these recvs
            // never block.
            let Ok(task) = self.receiver.recv() else {
                break;
            };
            (task.action)();
            if let Some(done) = task.done {
                // The submitter may have dropped its handle; that is fine.
                let _ = done.send(());
            }
        }
        if pending > 0 {
            log::debug!("task queue drained {} task(s)", pending);
        }
        pending
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Submission handle usable from any thread.
#[derive(Clone)]
pub struct TaskSender {
    sender: Sender<Task>,
}

impl TaskSender {
    /// Queues a task for the owning thread's next drain and returns
    /// immediately. Tasks from one sender run in submission order; no ordering
    /// is promised across senders beyond queue order at drain time.
    pub fn submit<F>(&self, action: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender
            .send(Task {
                action: Box::new(action),
                done: None,
            })
            .map_err(|_| PathlightError::TaskQueue("task queue is disconnected".into()))
    }

    /// Like [`submit`](Self::submit), but returns a handle that can block until
    /// the task has run.
    pub fn submit_tracked<F>(&self, action: F) -> Result<TaskHandle>
    where
        F: FnOnce() + Send + 'static,
    {
        let (done_tx, done_rx) = bounded(1);
        self.sender
            .send(Task {
                action: Box::new(action),
                done: Some(done_tx),
            })
            .map_err(|_| PathlightError::TaskQueue("task queue is disconnected".into()))?;
        Ok(TaskHandle {
            done: done_rx,
            completed: false,
        })
    }
}

/// Awaitable completion handle returned by [`TaskSender::submit_tracked`].
pub struct TaskHandle {
    done: Receiver<()>,
    // The drain sends the completion signal exactly once; remember it so
    // polling does not swallow it out of the channel.
    completed: bool,
}

impl TaskHandle {
    /// Blocks until the owning thread has executed the task.
    ///
    /// Calling this from the owning thread before it drains the queue blocks
    /// forever.
    pub fn wait(self) -> Result<()> {
        if self.completed {
            return Ok(());
        }
        self.done
            .recv()
            .map_err(|_| PathlightError::TaskQueue("task queue dropped before execution".into()))
    }

    /// Non-blocking completion check. Once this returns true it keeps
    /// returning true, and a subsequent [`wait`](Self::wait) succeeds
    /// immediately.
    pub fn is_done(&mut self) -> bool {
        if !self.completed {
            self.completed = self.done.try_recv().is_ok();
        }
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    fn init_test_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_single_drain_runs_everything_once() {
        init_test_logging();
        let queue = TaskQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut workers = Vec::new();
        for thread_id in 0..4usize {
            let sender = queue.sender();
            let log = log.clone();
            workers.push(thread::spawn(move || {
                for seq in 0..25usize {
                    let log = log.clone();
                    sender
                        .submit(move || log.lock().unwrap().push((thread_id, seq)))
                        .unwrap();
                }
            }));
        }
        for worker in workers {
            worker.join().unwrap();
        }

        assert!(queue.has_work());
        assert_eq!(queue.drain(), 100);
        assert!(!queue.has_work());
        assert_eq!(queue.drain(), 0);

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 100);

        // Each thread's own submissions ran in submission order.
        for thread_id in 0..4 {
            let seqs: Vec<usize> = log
                .iter()
                .filter(|(t, _)| *t == thread_id)
                .map(|(_, s)| *s)
                .collect();
            assert_eq!(seqs, (0..25).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_tracked_handle_unblocks_after_drain() {
        let queue = TaskQueue::new();
        let sender = queue.sender();

        let waiter = thread::spawn(move || {
            let handle = sender.submit_tracked(|| {}).unwrap();
            handle.wait().unwrap();
        });

        // Owning-thread tick loop until the waiter's task shows up.
        while queue.drain() == 0 {
            thread::yield_now();
        }
        waiter.join().unwrap();
    }

    #[test]
    fn test_is_done_is_sticky_and_wait_still_succeeds() {
        let queue = TaskQueue::new();
        let mut handle = queue.sender().submit_tracked(|| {}).unwrap();

        assert!(!handle.is_done());
        assert_eq!(queue.drain(), 1);

        // Polling must not swallow the completion signal: repeated polls keep
        // reporting done, and waiting afterwards succeeds.
        assert!(handle.is_done());
        assert!(handle.is_done());
        assert!(handle.wait().is_ok());
    }

    #[test]
    fn test_resubmission_during_drain_defers_to_next_tick() {
        let queue = TaskQueue::new();
        let sender = queue.sender();
        let ran = Arc::new(Mutex::new(Vec::new()));

        let inner_ran = ran.clone();
        let inner_sender = sender.clone();
        sender
            .submit(move || {
                inner_ran.lock().unwrap().push("outer");
                let inner_ran = inner_ran.clone();
                inner_sender
                    .submit(move || inner_ran.lock().unwrap().push("inner"))
                    .unwrap();
            })
            .unwrap();

        assert_eq!(queue.drain(), 1);
        assert_eq!(*ran.lock().unwrap(), vec!["outer"]);
        assert_eq!(queue.drain(), 1);
        assert_eq!(*ran.lock().unwrap(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_decode_fanout_hands_results_to_owner() {
        // Mirrors the cubemap loading path: a fixed fan-out of decode workers,
        // joined wait-all, each handing its face to the owning thread.
        let queue = TaskQueue::new();
        let faces = Arc::new(Mutex::new(vec![None; 6]));

        let workers: Vec<_> = (0..6usize)
            .map(|face| {
                let sender = queue.sender();
                let faces = faces.clone();
                thread::spawn(move || {
                    let decoded = vec![face as u8; 16];
                    sender
                        .submit(move || faces.lock().unwrap()[face] = Some(decoded))
                        .unwrap();
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(queue.drain(), 6);
        let faces = faces.lock().unwrap();
        for (face, data) in faces.iter().enumerate() {
            assert_eq!(data.as_deref(), Some(&vec![face as u8; 16][..]));
        }
    }
}

//! Per-URI lifecycle tasks with cooperative cancellation.
//!
//! At most one task is current per URI: `put` cancels and replaces the
//! prior task, `put_or_compose` chains behind it. Tasks receive a
//! [`CancellationToken`] to check at coarse boundaries; the registry also
//! races the whole future against the token so a superseded task stops
//! promptly at its next await point.

use std::collections::HashMap;
use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_lsp_server::ls_types::Uri;

struct FileTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Default)]
pub struct FileTasks {
    tasks: HashMap<Uri, FileTask>,
}

impl FileTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current task for `uri`, cancelling any prior one.
    pub fn put<F, Fut>(&mut self, uri: &Uri, f: F)
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if let Some(prev) = self.tasks.remove(uri) {
            prev.token.cancel();
        }
        let token = CancellationToken::new();
        let handle = spawn_guarded(token.clone(), f(token.clone()));
        self.tasks.insert(uri.clone(), FileTask { token, handle });
    }

    /// Chain a task behind the current one for `uri` (without cancelling
    /// it). The chained task shares the prior task's token, so `cancel`
    /// stops the whole chain.
    pub fn put_or_compose<F, Fut>(&mut self, uri: &Uri, f: F)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (token, prev_handle) = match self.tasks.remove(uri) {
            Some(prev) => (prev.token, Some(prev.handle)),
            None => (CancellationToken::new(), None),
        };
        let run_token = token.clone();
        let handle = tokio::spawn(async move {
            if let Some(prev) = prev_handle {
                let _ = prev.await;
            }
            let fut = f(run_token.clone());
            tokio::select! {
                biased;
                _ = run_token.cancelled() => {}
                _ = fut => {}
            }
        });
        self.tasks.insert(uri.clone(), FileTask { token, handle });
    }

    /// Cancel the current task for `uri`, if any.
    pub fn cancel(&mut self, uri: &Uri) {
        if let Some(task) = self.tasks.remove(uri) {
            task.token.cancel();
        }
    }

    /// Fire every task's token. Entries are retained so `wait_all` can
    /// still drain them at shutdown.
    pub fn cancel_all(&mut self) {
        for task in self.tasks.values() {
            task.token.cancel();
        }
    }

    /// Await completion of every registered task. For shutdown.
    pub async fn wait_all(&mut self) {
        for (_, task) in self.tasks.drain() {
            let _ = task.handle.await;
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

fn spawn_guarded(
    token: CancellationToken,
    fut: impl Future<Output = ()> + Send + 'static,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = token.cancelled() => {}
            _ = fut => {}
        }
    })
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use shelf_app::{ApiRequest, BookApi, Completion};
use shelf_tui::{AppRuntime, InternalEvent};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

/// Runs each request on its own worker thread against a shared client.
pub struct ApiRuntime<A> {
    api: Arc<A>,
}

impl<A> ApiRuntime<A> {
    pub fn new(api: A) -> Self {
        Self { api: Arc::new(api) }
    }
}

impl<A> AppRuntime for ApiRuntime<A>
where
    A: BookApi + Send + Sync + 'static,
{
    fn execute(&mut self, request: ApiRequest) -> Completion {
        shelf_app::execute(self.api.as_ref(), request)
    }

    fn spawn_request(&mut self, request: ApiRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let api = Arc::clone(&self.api);
        let label = request.label();
        thread::Builder::new()
            .name(format!("shelf-{}", label.replace(' ', "-")))
            .spawn(move || {
                let completion = shelf_app::execute(api.as_ref(), request);
                if tx.send(InternalEvent::Completed(completion)).is_err() {
                    tracing::debug!(request = label, "event loop closed; dropping completion");
                }
            })
            .with_context(|| format!("spawn {label} worker"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ApiRuntime;
    use anyhow::{Result, bail};
    use shelf_app::{ApiRequest, BusyFlag, Completion, CycleToken, UpsertRequest, UpsertStatus};
    use shelf_testkit::FakeShelf;
    use shelf_tui::{AppRuntime, InternalEvent};
    use std::sync::mpsc;
    use std::time::Duration;

    fn recv_completion(rx: &mpsc::Receiver<InternalEvent>) -> Result<Completion> {
        match rx.recv_timeout(Duration::from_secs(5))? {
            InternalEvent::Completed(completion) => Ok(completion),
            other => bail!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn worker_reports_completion_over_channel() -> Result<()> {
        let mut runtime = ApiRuntime::new(FakeShelf::seeded(25));
        let (tx, rx) = mpsc::channel();
        let token = CycleToken::new(7);

        runtime.spawn_request(ApiRequest::PageCount { token }, tx)?;

        assert_eq!(
            recv_completion(&rx)?,
            Completion::PageCount {
                token,
                result: Ok(3),
            }
        );
        Ok(())
    }

    #[test]
    fn worker_releases_busy_flag_before_reporting() -> Result<()> {
        let mut runtime = ApiRuntime::new(FakeShelf::seeded(1));
        let (tx, rx) = mpsc::channel();
        let flag = BusyFlag::default();
        let Some(guard) = flag.try_acquire() else {
            bail!("flag should be free");
        };

        runtime.spawn_request(
            ApiRequest::Upsert {
                request: UpsertRequest {
                    title: "dune".to_owned(),
                    pages: 412,
                },
                guard,
            },
            tx,
        )?;

        let completion = recv_completion(&rx)?;
        assert!(!flag.is_set());
        assert_eq!(
            completion,
            Completion::Upsert {
                title: "dune".to_owned(),
                result: Ok(UpsertStatus::Created),
            }
        );
        Ok(())
    }

    #[test]
    fn inline_execute_matches_worker_result() -> Result<()> {
        let mut runtime = ApiRuntime::new(FakeShelf::seeded(12));
        let token = CycleToken::new(1);
        let completion = runtime.execute(ApiRequest::Page { token, index: 2 });
        let Completion::Page { result, .. } = completion else {
            bail!("expected page completion");
        };
        assert_eq!(result?.len(), 2);
        Ok(())
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    ApiRequest, BusyFlag, Completion, CycleToken, FormStatus, ListRenderer, LoadCycle, Location,
    PageMove, UpsertForm, candidate, clamp_to_known, resolve,
};

/// Controller state. Mutated only from the UI thread through
/// [`AppState::dispatch`] and [`AppState::complete`].
#[derive(Debug)]
pub struct AppState {
    pub location: Location,
    pub cycle: LoadCycle,
    pub total_pages: Option<u32>,
    pub current_index: Option<u32>,
    pub form_status: FormStatus,
    pub alert: Option<String>,
    pub status_line: Option<String>,
    token: CycleToken,
    upsert_busy: BusyFlag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Start,
    Reload,
    NextPage,
    PrevPage,
    JumpToPage(String),
    Sort,
    SubmitUpsert(UpsertForm),
    DismissAlert,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, PartialEq)]
pub enum AppEvent {
    /// The runtime must execute this request and feed its completion back.
    Request(ApiRequest),
    CycleChanged(LoadCycle),
    LocationReplaced(u32),
    PageCountChanged(Option<u32>),
    Rendered { index: u32, count: usize },
    StaleResponse { token: CycleToken },
    BusyChanged(bool),
    FormStatusChanged(FormStatus),
    Alert(String),
    AlertDismissed,
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            cycle: LoadCycle::Idle,
            total_pages: None,
            current_index: None,
            form_status: FormStatus::Idle,
            alert: None,
            status_line: None,
            token: CycleToken::default(),
            upsert_busy: BusyFlag::default(),
        }
    }

    pub fn cycle_token(&self) -> CycleToken {
        self.token
    }

    pub fn upsert_busy(&self) -> bool {
        self.upsert_busy.is_set()
    }

    pub fn busy_flag(&self) -> &BusyFlag {
        &self.upsert_busy
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::Start | AppCommand::Reload => self.begin_cycle(),
            AppCommand::NextPage => self.paginate(PageMove::Next),
            AppCommand::PrevPage => self.paginate(PageMove::Prev),
            AppCommand::JumpToPage(raw) => self.paginate(PageMove::Jump(raw)),
            AppCommand::Sort => vec![
                self.set_status("sorting"),
                AppEvent::Request(ApiRequest::Sort),
            ],
            AppCommand::SubmitUpsert(form) => self.submit_upsert(&form),
            AppCommand::DismissAlert => {
                self.alert = None;
                vec![AppEvent::AlertDismissed]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    /// Applies a finished request. Responses from superseded cycles are
    /// dropped without touching the view.
    pub fn complete<R>(&mut self, completion: Completion, renderer: &mut R) -> Vec<AppEvent>
    where
        R: ListRenderer + ?Sized,
    {
        match completion {
            Completion::PageCount { token, .. } | Completion::Page { token, .. }
                if token != self.token =>
            {
                tracing::debug!(
                    stale = token.get(),
                    current = self.token.get(),
                    "dropping response from superseded cycle"
                );
                vec![AppEvent::StaleResponse { token }]
            }
            Completion::PageCount { token, result } => match result {
                Ok(total) => self.page_count_loaded(token, total),
                Err(error) => {
                    tracing::warn!(%error, "page count request failed");
                    self.total_pages = None;
                    self.cycle = LoadCycle::Failed;
                    vec![
                        AppEvent::PageCountChanged(None),
                        AppEvent::CycleChanged(self.cycle),
                        self.set_status(&format!("page count failed: {error}")),
                    ]
                }
            },
            Completion::Page {
                index, result, ..
            } => match result {
                Ok(books) => {
                    renderer.render(&books);
                    self.current_index = Some(index);
                    self.cycle = LoadCycle::Rendered;
                    tracing::info!(index, count = books.len(), "rendered page");
                    vec![
                        AppEvent::Rendered {
                            index,
                            count: books.len(),
                        },
                        AppEvent::CycleChanged(self.cycle),
                    ]
                }
                Err(error) => {
                    tracing::warn!(index, %error, "page request failed");
                    self.cycle = LoadCycle::Failed;
                    vec![
                        AppEvent::CycleChanged(self.cycle),
                        self.set_status(&format!("page {index} failed: {error}")),
                    ]
                }
            },
            Completion::Upsert { title, result } => {
                self.form_status = match result {
                    Ok(status) => {
                        tracing::info!(%title, status = status.as_str(), "upsert finished");
                        FormStatus::Saved(status)
                    }
                    Err(error) => {
                        tracing::warn!(%title, %error, "upsert failed");
                        FormStatus::Failed(error.to_string())
                    }
                };
                vec![
                    AppEvent::FormStatusChanged(self.form_status.clone()),
                    AppEvent::BusyChanged(self.upsert_busy()),
                ]
            }
            Completion::Sort { result } => match result {
                Ok(()) => {
                    let mut events = vec![self.set_status("sorted")];
                    events.extend(self.begin_cycle());
                    events
                }
                Err(error) => {
                    tracing::warn!(%error, "sort request failed");
                    vec![self.set_status(&format!("sort failed: {error}"))]
                }
            },
        }
    }

    fn begin_cycle(&mut self) -> Vec<AppEvent> {
        self.token = self.token.next();
        self.cycle = LoadCycle::CountPending;
        tracing::debug!(token = self.token.get(), "begin load cycle");
        vec![
            AppEvent::CycleChanged(self.cycle),
            AppEvent::Request(ApiRequest::PageCount { token: self.token }),
        ]
    }

    fn page_count_loaded(&mut self, token: CycleToken, total: u32) -> Vec<AppEvent> {
        self.total_pages = Some(total);
        let mut events = vec![AppEvent::PageCountChanged(Some(total))];

        let resolution = resolve(self.location.page_index(), total);
        if resolution.clamped {
            self.location.replace_page_index(resolution.index);
            events.push(AppEvent::LocationReplaced(resolution.index));
        }

        self.cycle = LoadCycle::DataPending;
        events.push(AppEvent::CycleChanged(self.cycle));
        events.push(AppEvent::Request(ApiRequest::Page {
            token,
            index: resolution.index,
        }));
        events
    }

    fn paginate(&mut self, page_move: PageMove) -> Vec<AppEvent> {
        let index = clamp_to_known(
            candidate(self.location.page_index(), &page_move),
            self.total_pages,
        );
        self.location.replace_page_index(index);

        let mut events = vec![AppEvent::LocationReplaced(index)];
        events.extend(self.begin_cycle());
        events
    }

    fn submit_upsert(&mut self, form: &UpsertForm) -> Vec<AppEvent> {
        let request = match form.validate() {
            Ok(request) => request,
            Err(error) => {
                let message = error.to_string();
                self.alert = Some(message.clone());
                return vec![AppEvent::Alert(message)];
            }
        };

        let Some(guard) = self.upsert_busy.try_acquire() else {
            return vec![self.set_status("save already in progress")];
        };

        self.form_status = FormStatus::Saving;
        vec![
            AppEvent::BusyChanged(true),
            AppEvent::FormStatusChanged(FormStatus::Saving),
            AppEvent::Request(ApiRequest::Upsert { request, guard }),
        ]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

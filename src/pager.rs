//! Pagination state and the rules for starting and finishing a page load.

use crate::{
    error::LoadError,
    page::{Criteria, PageInfo, PageRequest, PageUpdate},
};

/// A fetch that has been started and is waiting for the loader.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub generation: u64,
    pub request: PageRequest,
    pub is_reload: bool,
}

/// Arguments of a load that failed, kept around so it can be retried.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedLoad {
    pub page_num: u32,
    pub filters: Option<Criteria>,
    pub sorts: Option<Criteria>,
    pub is_reload: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStep {
    /// The requested page lies past the end, nothing to fetch.
    Exhausted,
    /// An incremental load is already in flight.
    Busy,
    Fetch(Ticket),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The page was merged into the displayed list.
    Applied,
    Exhausted,
    Busy,
    /// A newer load started while this one was in flight; its result was dropped.
    Stale,
    Failed(LoadError),
    /// No loader is configured.
    Skipped,
}

pub struct PageState<T> {
    data_list: Vec<T>,
    data_source: PageInfo<T>,
    loading: bool,
    has_more: bool,
    error: Option<LoadError>,
    failed: Option<FailedLoad>,
    generation: u64,
}

impl<T: Clone> PageState<T> {
    pub fn new(data_source: PageInfo<T>) -> Self {
        Self {
            data_list: data_source.list.clone(),
            data_source,
            loading: false,
            has_more: true,
            error: None,
            failed: None,
            generation: 0,
        }
    }

    pub fn data_list(&self) -> &[T] {
        &self.data_list
    }

    pub fn data_source(&self) -> &PageInfo<T> {
        &self.data_source
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    pub fn failed(&self) -> Option<&FailedLoad> {
        self.failed.as_ref()
    }

    /// Whether the scroll side may ask for the next page right now.
    pub fn can_request_more(&self) -> bool {
        !self.loading && self.has_more && self.error.is_none()
    }

    /// Swap in a new handle supplied from outside. The displayed rows stay
    /// until the reload that follows replaces them.
    pub fn replace_source(&mut self, data_source: PageInfo<T>) {
        self.data_source = data_source;
    }

    pub fn begin(
        &mut self,
        page_num: u32,
        page_size: u32,
        filters: Option<Criteria>,
        sorts: Option<Criteria>,
        is_reload: bool,
    ) -> LoadStep {
        if self.loading && !is_reload {
            return LoadStep::Busy;
        }
        if self.data_source.is_past_end(page_num) {
            self.has_more = false;
            self.loading = false;
            return LoadStep::Exhausted;
        }

        self.loading = true;
        self.has_more = true;
        self.error = None;
        self.failed = None;
        self.generation += 1;

        let request = self
            .data_source
            .jump_page(page_num, page_size)
            .filter(filters)
            .sort_by(sorts);
        LoadStep::Fetch(Ticket {
            generation: self.generation,
            request,
            is_reload,
        })
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation
    }

    /// Drop whatever is in flight. Any ticket handed out so far becomes stale.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.loading = false;
    }

    pub fn complete(
        &mut self,
        ticket: &Ticket,
        result: Result<PageUpdate<T>, LoadError>,
    ) -> LoadOutcome {
        if !self.is_current(ticket) {
            return LoadOutcome::Stale;
        }
        self.loading = false;

        let update = match result {
            Ok(update) => update,
            Err(err) => {
                self.error = Some(err.clone());
                self.failed = Some(FailedLoad {
                    page_num: ticket.request.page_num,
                    filters: Some(ticket.request.filters.clone()),
                    sorts: Some(ticket.request.sorts.clone()),
                    is_reload: ticket.is_reload,
                });
                return LoadOutcome::Failed(err);
            }
        };

        let merged = self.data_source.merge(update);
        if ticket.is_reload {
            self.data_list = merged.list.clone();
        } else {
            self.data_list.extend(merged.list.iter().cloned());
        }
        self.data_source = merged;
        LoadOutcome::Applied
    }
}

//! # Product Search
//!
//! Wraps `sp_SearchProducts`. An empty term renders an empty result set
//! without touching the database.

use super::{Page, PageOutcome, NO_DATABASE};
use crate::db::{catalog, RequestDb, RowSet};
use crate::flash::FlashQueue;
use crate::translate::flash_for;

pub const PATH: &str = "/search";

/// Render data; field names are the template keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchView {
    pub search_term: String,
    pub results: RowSet,
}

/// Handle `GET /search?search_term=...`
pub async fn run(db: &mut RequestDb, search_term: &str, flashes: &mut FlashQueue) -> PageOutcome {
    let mut view = SearchView {
        search_term: search_term.to_string(),
        results: Vec::new(),
    };
    if search_term.is_empty() {
        return PageOutcome::Render(Page::Search(view));
    }

    let Some(session) = db.acquire().await else {
        flashes.error(NO_DATABASE);
        return PageOutcome::Render(Page::Search(view));
    };

    match catalog::search_products(session, search_term).await {
        Ok(rows) => {
            view.results = rows;
            PageOutcome::Render(Page::Search(view))
        }
        Err(err) => {
            flashes.push(flash_for(&err));
            PageOutcome::Redirect(PATH)
        }
    }
}

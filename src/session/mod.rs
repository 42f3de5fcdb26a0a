/*!
 * Translation sessions.
 *
 * This module provides:
 * - `BookSession`, the state machine driving one book from archive to archive
 * - Progress snapshots and ETA formatting for observers
 * - A shared stop switch for pausing at unit boundaries
 */

pub mod manager;
pub mod models;

pub use manager::BookSession;
pub use models::{
    format_eta, DocumentPlan, ProgressSnapshot, ProgressStats, ResultMap, SessionControl, SessionSettings,
    SessionState, TextUnit, Workspace,
};

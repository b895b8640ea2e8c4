//! # deepflow-remote
//!
//! HTTP adapter that implements [`deepflow_core::RemoteStore`] against a
//! PostgREST endpoint (the REST face of a hosted Postgres such as Supabase).
//!
//! The core never sees HTTP: it hands over JSON rows in the remote schema and
//! gets rows back. Everything protocol-specific (URL layout, filter syntax,
//! auth headers, `Prefer` directives) lives in this crate.

mod postgrest;

pub use postgrest::PostgrestStore;

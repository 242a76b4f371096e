// Library root
// -----------
// The binary (`main.rs`) parses flags, opens the store and hands it to the
// interactive UI. Everything below the UI is usable without a terminal.
//
// Module responsibilities:
// - `models`: the user, course and enrollment records and the role enum.
// - `store`: the flat-file record store with its uniqueness checks.
// - `auth`: password hashing and the bounded-attempt login loop.
// - `actions`: role-tagged accounts and what each role may do.
// - `table`: plain-text report tables.
// - `config`: command-line flags and the default data directory.
// - `ui`: dialoguer menus tying the pieces together.
pub mod actions;
pub mod auth;
pub mod config;
pub mod models;
pub mod store;
pub mod table;
pub mod ui;

//! Core data models for redirect synchronization.
//!
//! A run compares desired state ([`redirect::RedirectEntry`]) against a
//! snapshot of remote state ([`object::RemoteObject`]) and produces
//! [`action::ActionRecord`]s describing what changed.

pub mod action;
pub mod object;
pub mod redirect;

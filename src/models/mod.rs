// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod blog;
pub mod contact;
pub mod diet;
pub mod user;

pub use blog::{Blog, BlogSummary, BlogUpdate, NewBlog};
pub use contact::{Contact, NewContact};
pub use diet::{Diet, NewDiet};
pub use user::{NewUser, User, UserProfile};

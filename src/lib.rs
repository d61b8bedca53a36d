// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Fetches web pages on behalf of an agent: honours robots.txt, retrieves the
//! page, simplifies HTML to Markdown and paginates the result.

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

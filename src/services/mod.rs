// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod logging;
pub mod observer;
pub mod paginator;
pub mod pipeline;
pub mod readability;
pub mod retriever;
pub mod robots;
pub mod robots_cache;
pub mod transform;

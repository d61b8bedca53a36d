// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod fetch;
pub mod tool;
pub mod version;

// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module provides the configuration, rendering and demo flows of the `realty` client.

pub mod config;
pub mod demo;
pub mod listings;

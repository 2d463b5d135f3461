// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use relational_auth_gate::{config::Settings, observability::init_tracing, server};

#[tokio::main]
async fn main() {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    init_tracing(settings.log_format);

    // `run` has already closed the user database when it returns.
    if let Err(e) = server::run(settings).await {
        tracing::error!(error = %e, "Relational Auth Gate stopped");
        std::process::exit(1);
    }
}

use chrono::Utc;
use log::{info, warn};
use yew::prelude::*;

use crate::config::get_signup_config;
use crate::signup::{LocalStorage, SignupSystem};

/// Admin view of everything stored locally: members, counters and the export
/// time, as pretty JSON ready to copy.
#[function_component(Export)]
pub fn export() -> Html {
    let exported = use_memo(
        |_| {
            let now = Utc::now();
            let system = SignupSystem::load(LocalStorage, get_signup_config(), now);
            let stats = system.registry().stats(now);
            match system.export_json(now) {
                Ok(json) => {
                    info!("Exported {} members", system.registry().count());
                    Ok((stats, json))
                }
                Err(e) => {
                    warn!("Export failed: {}", e);
                    Err(e.to_string())
                }
            }
        },
        (),
    );

    html! {
        <div class="export-page">
            <h1>{"Data export"}</h1>
            {
                match &*exported {
                    Ok((stats, json)) => html! {
                        <>
                            <p class="export-summary">
                                {format!(
                                    "{} members, {} active, {} registered today",
                                    stats.total, stats.active, stats.registered_today
                                )}
                            </p>
                            <pre class="export-json">{json.clone()}</pre>
                        </>
                    },
                    Err(e) => html! { <p class="export-error">{format!("Export failed: {}", e)}</p> },
                }
            }
            <style>
                {r#"
                .export-page {
                    padding: 100px 2rem 2rem;
                    max-width: 1000px;
                    margin: 0 auto;
                    color: #fff;
                }
                .export-json {
                    background: rgba(30, 30, 30, 0.8);
                    border: 1px solid rgba(139, 92, 246, 0.2);
                    border-radius: 8px;
                    padding: 1.5rem;
                    overflow-x: auto;
                    font-size: 0.85rem;
                }
                .export-summary {
                    color: #bbb;
                }
                .export-error {
                    color: #EF4444;
                }
                "#}
            </style>
        </div>
    }
}

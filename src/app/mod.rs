//! Page components and the signal wiring between them and the core.
//!
//! Every wallet call runs in a spawned task on the browser's event loop. The
//! session is read once at the start of a task, passed to the operation,
//! and only replaced when the operation hands back a new one.

use crate::config::Config;
use crate::indexer::{AccountSnapshot, IndexerClient};
use crate::notice::{abbreviate_key, Notice, NoticeKind};
use crate::picker::WalletPicker;
use crate::transition::{BusyFlag, ClaimIntent, StakeIntent, TransitionSubmitter};
use crate::wallet::{adapter_for, WalletId, WalletSession};
use dioxus::prelude::*;
use tracing::{error, info};

#[derive(Clone, Routable, Debug, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[route("/")]
    Market {},
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

impl BusyFlag for Signal<bool> {
    fn is_busy(&self) -> bool {
        *self.peek()
    }

    fn set_busy(&mut self, busy: bool) {
        self.set(busy);
    }
}

/// Bundled config, or defaults if it fails to parse.
pub fn load_config() -> Config {
    match Config::embedded() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid bundled config, using defaults");
            Config::default()
        }
    }
}

#[component]
pub fn App() -> Element {
    use_context_provider(load_config);

    rsx! {
        Router::<Route> {}
    }
}

#[component]
fn Market() -> Element {
    let config = use_context::<Config>();
    let submitter = use_hook(|| TransitionSubmitter::new(&config.program));

    let mut session = use_signal(WalletSession::disconnected);
    let mut busy = use_signal(|| false);
    let mut notice = use_signal(|| None::<Notice>);
    let mut picker_open = use_signal(|| false);
    let mut connecting = use_signal(|| false);
    let mut account = use_signal(|| None::<AccountSnapshot>);

    let mut event_id = use_signal(String::new);
    let mut stake_amount = use_signal(String::new);
    let mut prediction = use_signal(|| true);
    let mut claim_amount = use_signal(String::new);

    let on_wallet_selected = {
        let config = config.clone();
        move |id: WalletId| {
            picker_open.set(false);
            if *connecting.peek() {
                return;
            }
            connecting.set(true);
            let adapter = adapter_for(id, &config);
            let indexer = IndexerClient::from_config(&config);
            spawn(async move {
                let current = session.peek().clone();
                let result = match current.connect(adapter).await {
                    Ok(next) => {
                        let now = session.peek().clone();
                        next.settle(&now).await
                    }
                    Err(e) => Err(e),
                };
                connecting.set(false);

                match result {
                    Ok(next) => {
                        let name = next.wallet_name().unwrap_or_default().to_string();
                        let key = next.public_key().map(str::to_string);
                        session.set(next);
                        notice.set(Some(Notice::connected(&name)));
                        if let Some(key) = key {
                            let snapshot = indexer.account_snapshot(&key).await;
                            // the user may have disconnected while the lookup ran
                            if session.peek().owns_key(&key) {
                                account.set(Some(snapshot));
                            }
                        }
                    }
                    Err(e) => notice.set(Some(Notice::connect_failed(&e))),
                }
            });
        }
    };

    let on_disconnect = move |_| {
        spawn(async move {
            let current = session.peek().clone();
            match current.disconnect().await {
                Ok(next) => {
                    session.set(next);
                    account.set(None);
                    notice.set(Some(Notice::disconnected()));
                }
                Err(e) => notice.set(Some(Notice::disconnect_failed(&e))),
            }
        });
    };

    let on_stake = {
        let submitter = submitter.clone();
        move |_| {
            let submitter = submitter.clone();
            let intent = StakeIntent {
                event_id: event_id(),
                stake_amount: stake_amount(),
                prediction: prediction(),
            };
            spawn(async move {
                let current = session.peek().clone();
                let result = submitter.stake(&current, &intent, &mut busy).await;
                if let Ok(tx_id) = &result {
                    info!(tx_id = %tx_id, "stake placed");
                }
                notice.set(Some(Notice::staked(&result)));
            });
        }
    };

    let on_claim = move |_| {
        let submitter = submitter.clone();
        let intent = ClaimIntent {
            event_id: event_id(),
            claim_amount: claim_amount(),
        };
        spawn(async move {
            let current = session.peek().clone();
            let result = submitter.claim(&current, &intent, &mut busy).await;
            if let Ok(tx_id) = &result {
                info!(tx_id = %tx_id, "winnings claimed");
            }
            notice.set(Some(Notice::claimed(&result)));
        });
    };

    let connected = session.read().is_connected();
    let controls_disabled = busy() || !connected;
    let banner = session.read().public_key().map(abbreviate_key);
    let prediction_value = if prediction() { "true" } else { "false" };
    let stake_label = if busy() { "Processing..." } else { "Place Stake" };
    let claim_label = if busy() { "Processing..." } else { "Claim Winnings" };
    let (stake_tone, claim_tone) = if controls_disabled {
        ("bg-slate-700 text-slate-400 cursor-not-allowed", "bg-slate-700 text-slate-400 cursor-not-allowed")
    } else {
        ("bg-gradient-to-r from-purple-500 to-pink-600", "bg-gradient-to-r from-emerald-500 to-teal-600")
    };

    rsx! {
        div { class: "min-h-screen bg-gradient-to-b from-slate-900 to-slate-800 text-white",
            Header {
                connected: connected,
                connecting: connecting(),
                busy: busy(),
                on_connect: move |_| picker_open.set(true),
                on_disconnect: on_disconnect,
            }
            WalletPicker {
                open: picker_open(),
                on_select: on_wallet_selected,
                on_close: move |_| picker_open.set(false),
            }
            main { class: "container mx-auto px-4 py-12",
                div { class: "mx-auto max-w-4xl",
                    div { class: "mb-12 text-center",
                        h1 { class: "mb-4 bg-gradient-to-r from-purple-400 to-pink-600 bg-clip-text text-5xl font-bold text-transparent",
                            "ZK Prediction Market"
                        }
                        p { class: "mx-auto max-w-2xl text-lg text-slate-300",
                            "A zero-knowledge prediction market on the Aleo blockchain where users stake \
                             credits on event outcomes, with payouts determined by a stake-weighted voting \
                             system that decays over time for fairness and privacy."
                        }
                    }

                    if let Some(current) = notice() {
                        NoticeBanner {
                            notice: current,
                            on_dismiss: move |_| notice.set(None),
                        }
                    }

                    if let Some(key) = banner {
                        div { class: "mb-8 flex items-center justify-center rounded-full border border-slate-700 bg-slate-800/50 px-6 py-3",
                            p { class: "font-medium text-emerald-400", "Connected: {key}" }
                        }
                    }

                    if let Some(snapshot) = account() {
                        AccountPanel { snapshot: snapshot }
                    }

                    div { class: "grid gap-8 md:grid-cols-2",
                        div { class: "rounded-2xl border border-slate-700 bg-slate-800/60 p-6 shadow-xl",
                            h3 { class: "mb-6 text-xl font-bold", "Stake on an Event" }
                            div { class: "space-y-4",
                                FieldLabel { label: "Event ID" }
                                input {
                                    class: "w-full rounded-lg border border-slate-700 bg-slate-900/70 p-3",
                                    r#type: "text",
                                    placeholder: "e.g., 123",
                                    value: "{event_id}",
                                    oninput: move |evt| event_id.set(evt.value()),
                                }
                                FieldLabel { label: "Stake Amount" }
                                input {
                                    class: "w-full rounded-lg border border-slate-700 bg-slate-900/70 p-3",
                                    r#type: "number",
                                    placeholder: "Amount in microcredits",
                                    value: "{stake_amount}",
                                    oninput: move |evt| stake_amount.set(evt.value()),
                                }
                                FieldLabel { label: "Your Prediction" }
                                select {
                                    class: "w-full rounded-lg border border-slate-700 bg-slate-900/70 p-3",
                                    value: "{prediction_value}",
                                    onchange: move |evt| prediction.set(evt.value() == "true"),
                                    option { value: "true", "Yes" }
                                    option { value: "false", "No" }
                                }
                                button {
                                    class: "w-full rounded-lg px-4 py-3 font-medium {stake_tone}",
                                    disabled: controls_disabled,
                                    onclick: on_stake,
                                    "{stake_label}"
                                }
                            }
                        }

                        div { class: "rounded-2xl border border-slate-700 bg-slate-800/60 p-6 shadow-xl",
                            h3 { class: "mb-6 text-xl font-bold", "Claim Winnings" }
                            div { class: "space-y-4",
                                FieldLabel { label: "Event ID" }
                                input {
                                    class: "w-full rounded-lg border border-slate-700 bg-slate-900/70 p-3",
                                    r#type: "text",
                                    placeholder: "e.g., 123",
                                    value: "{event_id}",
                                    oninput: move |evt| event_id.set(evt.value()),
                                }
                                FieldLabel { label: "Claim Amount" }
                                input {
                                    class: "w-full rounded-lg border border-slate-700 bg-slate-900/70 p-3",
                                    r#type: "number",
                                    placeholder: "Amount in microcredits",
                                    value: "{claim_amount}",
                                    oninput: move |evt| claim_amount.set(evt.value()),
                                }
                                div { class: "pt-8",
                                    button {
                                        class: "w-full rounded-lg px-4 py-3 font-medium {claim_tone}",
                                        disabled: controls_disabled,
                                        onclick: on_claim,
                                        "{claim_label}"
                                    }
                                }
                            }
                        }
                    }
                }
            }
            footer { class: "py-6 text-center text-sm text-slate-500",
                p { "© 2025 ZK Prediction Market on Aleo • Privacy-First Predictions" }
            }
        }
    }
}

#[component]
fn Header(
    connected: bool,
    connecting: bool,
    busy: bool,
    on_connect: EventHandler<()>,
    on_disconnect: EventHandler<()>,
) -> Element {
    rsx! {
        header { class: "flex items-center justify-between border-b border-slate-700 px-6 py-4",
            span { class: "text-lg font-semibold", "ZK Prediction Market" }
            if connected {
                button {
                    class: "rounded-lg bg-slate-700 px-4 py-2",
                    disabled: busy,
                    onclick: move |_| on_disconnect.call(()),
                    "Disconnect"
                }
            } else {
                button {
                    class: "rounded-lg bg-purple-600 px-4 py-2",
                    disabled: connecting,
                    onclick: move |_| on_connect.call(()),
                    if connecting { "Connecting..." } else { "Connect Wallet" }
                }
            }
        }
    }
}

#[component]
fn NoticeBanner(notice: Notice, on_dismiss: EventHandler<()>) -> Element {
    let tone = match notice.kind {
        NoticeKind::Success => "border-emerald-500 text-emerald-300",
        NoticeKind::Info => "border-slate-500 text-slate-200",
        NoticeKind::Error => "border-red-500 text-red-300",
    };
    rsx! {
        div { class: "mb-8 flex items-center justify-between rounded-lg border bg-slate-800/80 px-4 py-3 {tone}",
            p { class: "break-all", "{notice.message}" }
            button { class: "ml-4 text-slate-400", onclick: move |_| on_dismiss.call(()), "✕" }
        }
    }
}

/// Public balance in the unit the amount fields take.
fn balance_label(snapshot: &AccountSnapshot) -> String {
    snapshot
        .public_balance
        .map(|b| format!("{b} microcredits"))
        .unwrap_or_else(|| "unavailable".to_string())
}

#[component]
fn AccountPanel(snapshot: AccountSnapshot) -> Element {
    let balance = balance_label(&snapshot);
    let height = snapshot
        .latest_height
        .map(|h| h.to_string())
        .unwrap_or_else(|| "unavailable".to_string());
    rsx! {
        div { class: "mb-8 flex justify-center gap-8 text-sm text-slate-300",
            span { "Public balance: {balance}" }
            span { "Block height: {height}" }
        }
    }
}

#[component]
fn FieldLabel(label: &'static str) -> Element {
    rsx! {
        label { class: "mb-1 block text-sm font-medium text-slate-300", "{label}" }
    }
}

#[component]
fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        div { class: "flex min-h-screen flex-col items-center justify-center gap-4 bg-slate-900 text-white",
            h1 { class: "text-3xl font-bold", "Nothing at /{path}" }
            Link { class: "text-purple-400 underline", to: Route::Market {}, "Back to the market" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::{SubmitError, TransitionRequest};
    use crate::wallet::{AdapterError, WalletAdapter};
    use async_trait::async_trait;
    use dioxus::dioxus_core::VirtualDom;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct Outcome {
        busy_during: Option<bool>,
        busy_after: bool,
        result: Result<String, SubmitError>,
    }

    thread_local! {
        static OUTCOMES: RefCell<Vec<Outcome>> = RefCell::new(Vec::new());
    }

    /// Adapter that reads the page's busy signal while a transition runs.
    struct SignalAdapter {
        busy: Signal<bool>,
        seen: Cell<Option<bool>>,
    }

    #[async_trait(?Send)]
    impl WalletAdapter for SignalAdapter {
        fn name(&self) -> &str {
            "Signal Wallet"
        }

        async fn connect(&self) -> Result<(), AdapterError> {
            Ok(())
        }

        async fn disconnect(&self) -> Result<(), AdapterError> {
            Ok(())
        }

        async fn public_key(&self) -> Result<String, AdapterError> {
            Ok("aleo1owner".to_string())
        }

        async fn execute(&self, _request: &TransitionRequest) -> Result<String, AdapterError> {
            self.seen.set(Some(*self.busy.peek()));
            Ok("at1signal".to_string())
        }
    }

    fn SubmitHarness() -> Element {
        let busy = use_signal(|| false);
        use_hook(move || {
            let adapter = Rc::new(SignalAdapter {
                busy,
                seen: Cell::new(None),
            });
            let session = block_on(WalletSession::disconnected().connect(adapter.clone())).unwrap();
            let submitter = TransitionSubmitter::new(&Config::default().program);
            let intent = StakeIntent {
                event_id: "123".to_string(),
                stake_amount: "50".to_string(),
                prediction: true,
            };

            let mut flag = busy;
            let result = block_on(submitter.stake(&session, &intent, &mut flag));
            OUTCOMES.with(|o| {
                o.borrow_mut().push(Outcome {
                    busy_during: adapter.seen.get(),
                    busy_after: *busy.peek(),
                    result,
                })
            });

            // a pending submission keeps the second click out
            adapter.seen.set(None);
            flag.set_busy(true);
            let result = block_on(submitter.stake(&session, &intent, &mut flag));
            OUTCOMES.with(|o| {
                o.borrow_mut().push(Outcome {
                    busy_during: adapter.seen.get(),
                    busy_after: *busy.peek(),
                    result,
                })
            });
        });
        rsx! {}
    }

    #[test]
    fn test_balance_label_uses_field_unit() {
        let snapshot = AccountSnapshot {
            public_balance: Some(1_500_000),
            latest_height: Some(10),
        };
        assert_eq!(balance_label(&snapshot), "1500000 microcredits");
        assert_eq!(balance_label(&AccountSnapshot::default()), "unavailable");
    }

    #[test]
    fn test_busy_signal_tracks_submission() {
        let mut dom = VirtualDom::new(SubmitHarness);
        dom.rebuild_in_place();

        OUTCOMES.with(|o| {
            let outcomes = o.borrow();
            assert_eq!(outcomes.len(), 2);

            assert_eq!(outcomes[0].busy_during, Some(true));
            assert!(!outcomes[0].busy_after);
            assert_eq!(outcomes[0].result, Ok("at1signal".to_string()));

            assert_eq!(outcomes[1].busy_during, None);
            assert!(outcomes[1].busy_after);
            assert_eq!(outcomes[1].result, Err(SubmitError::InFlight));
        });
    }
}

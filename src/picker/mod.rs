//! Wallet picker modal.
//!
//! Lists the supported wallets and relays the clicked id to the caller. It
//! never touches an adapter: mapping the id to a wallet and connecting is
//! the caller's job.

use crate::wallet::WalletId;
use dioxus::prelude::*;

/// Click handler that forwards exactly `id`, whatever the event carried.
fn relay<E: 'static>(on_select: EventHandler<WalletId>, id: WalletId) -> impl FnMut(E) + 'static {
    move |_| on_select.call(id)
}

#[component]
pub fn WalletPicker(
    open: bool,
    on_select: EventHandler<WalletId>,
    on_close: EventHandler<()>,
) -> Element {
    if !open {
        return None;
    }

    rsx! {
        div {
            class: "fixed inset-0 z-50 flex items-center justify-center bg-black/60",
            onclick: move |_| on_close.call(()),
            div {
                class: "w-full max-w-md rounded-xl bg-white p-6 text-slate-900 shadow-2xl",
                // keep clicks inside the dialog from closing it
                onclick: move |evt| evt.stop_propagation(),
                div { class: "mb-4 flex items-center justify-between",
                    h2 { class: "text-lg font-semibold", "Connect Wallet" }
                    button {
                        class: "rounded-md px-2 text-slate-500 hover:bg-gray-200",
                        onclick: move |_| on_close.call(()),
                        "✕"
                    }
                }
                div { class: "grid grid-cols-2 items-center justify-between",
                    for id in WalletId::ALL {
                        button {
                            key: "{id}",
                            class: "flex w-full flex-col items-center justify-between rounded-md p-4 hover:bg-gray-200",
                            onclick: relay::<MouseEvent>(on_select, id),
                            div { class: "flex flex-col items-center gap-4",
                                img {
                                    class: "h-8 w-8 rounded-full object-cover",
                                    src: id.icon(),
                                    alt: id.display_name(),
                                }
                                span { {id.display_name()} }
                            }
                        }
                    }
                }
            }
        }
    }
}

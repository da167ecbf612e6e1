use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, KeyboardEvent};
use yew::prelude::*;

use crate::auth::verify::CodeEntry;
use crate::signup::verification::{CodeInput, DeliveryTicket};
use crate::signup::{LocalStorage, SignupEvent, SignupSystem, Step};

/// The page's single signup system, shared between the wizard, the growth
/// timer and the counters.
#[derive(Clone)]
pub struct SharedSignup(Rc<RefCell<SignupSystem<LocalStorage>>>);

impl PartialEq for SharedSignup {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl SharedSignup {
    pub fn new(system: SignupSystem<LocalStorage>) -> Self {
        Self(Rc::new(RefCell::new(system)))
    }

    /// Runs one operation and hands whatever it announced to `on_events`.
    /// The borrow is released before the callback fires, so handlers may
    /// read the system again.
    pub fn run<T>(
        &self,
        on_events: &Callback<Vec<SignupEvent>>,
        op: impl FnOnce(&mut SignupSystem<LocalStorage>) -> T,
    ) -> T {
        let (out, events) = {
            let mut system = self.0.borrow_mut();
            let out = op(&mut *system);
            (out, system.drain_events())
        };
        if !events.is_empty() {
            on_events.emit(events);
        }
        out
    }

    pub fn read<T>(&self, f: impl FnOnce(&SignupSystem<LocalStorage>) -> T) -> T {
        f(&*self.0.borrow())
    }
}

/// Shared by the signup and login modals.
pub const MODAL_STYLE: &str = r#"
    .modal-overlay {
        position: fixed;
        inset: 0;
        background: rgba(0, 0, 0, 0.75);
        display: flex;
        align-items: center;
        justify-content: center;
        z-index: 9000;
    }
    .modal-content {
        position: relative;
        background: rgba(30, 30, 30, 0.95);
        border: 1px solid rgba(139, 92, 246, 0.3);
        border-radius: 16px;
        padding: 2.5rem;
        width: 100%;
        max-width: 440px;
        color: #fff;
        box-shadow: 0 8px 32px rgba(0, 0, 0, 0.3);
    }
    .modal-close {
        position: absolute;
        top: 1rem;
        right: 1rem;
        background: none;
        border: none;
        color: #999;
        font-size: 1.5rem;
        cursor: pointer;
    }
    .modal-step {
        display: flex;
        flex-direction: column;
        gap: 1rem;
        text-align: center;
    }
    .modal-input, .code-input {
        padding: 0.8rem 1rem;
        border-radius: 8px;
        border: 1px solid rgba(139, 92, 246, 0.3);
        background: rgba(0, 0, 0, 0.4);
        color: #fff;
        font-size: 1rem;
    }
    .code-input {
        text-align: center;
        letter-spacing: 0.5em;
        font-size: 1.5rem;
    }
    .modal-button {
        padding: 0.9rem;
        border: none;
        border-radius: 8px;
        background: linear-gradient(45deg, #8B5CF6, #6D28D9);
        color: #fff;
        font-weight: 600;
        cursor: pointer;
    }
    .modal-button:disabled {
        opacity: 0.5;
        cursor: not-allowed;
    }
    .modal-link {
        background: none;
        border: none;
        color: #8B5CF6;
        cursor: pointer;
        text-decoration: underline;
    }
    .resend-wait {
        color: #999;
        font-size: 0.9rem;
    }
    .confirmed-email {
        font-weight: 600;
        color: #8B5CF6;
    }
"#;

/// Emits `on_close` when Escape is pressed while the calling component is
/// mounted.
#[hook]
pub fn use_close_on_escape(on_close: Callback<()>) {
    use_effect_with_deps(
        move |_| {
            let window = web_sys::window();
            let listener = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                if e.key() == "Escape" {
                    on_close.emit(());
                }
            }) as Box<dyn FnMut(KeyboardEvent)>);
            if let Some(window) = &window {
                let _ = window
                    .add_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref());
            }
            move || {
                if let Some(window) = window {
                    let _ = window.remove_event_listener_with_callback(
                        "keydown",
                        listener.as_ref().unchecked_ref(),
                    );
                }
            }
        },
        (),
    );
}

#[derive(Properties, PartialEq)]
pub struct RegistrationModalProps {
    pub system: SharedSignup,
    pub step: Step,
    pub on_close: Callback<()>,
    pub on_events: Callback<Vec<SignupEvent>>,
}

type Slot<T> = Rc<RefCell<Option<T>>>;

fn schedule_delivery(
    slot: &Slot<Timeout>,
    system: SharedSignup,
    on_events: Callback<Vec<SignupEvent>>,
    ticket: DeliveryTicket,
) {
    let delay = system.read(|s| s.config().code_delivery_delay_ms);
    let timeout = Timeout::new(delay, move || {
        system.run(&on_events, |s| s.deliver_code(ticket));
    });
    // Replacing the old timeout cancels it.
    *slot.borrow_mut() = Some(timeout);
}

fn start_countdown(slot: &Slot<Interval>, system: SharedSignup, remaining: UseStateHandle<i64>) {
    remaining.set(system.read(|s| s.session().resend_remaining_secs(Utc::now())));
    let interval = Interval::new(1_000, move || {
        remaining.set(system.read(|s| s.session().resend_remaining_secs(Utc::now())));
    });
    *slot.borrow_mut() = Some(interval);
}

#[function_component(RegistrationModal)]
pub fn registration_modal(props: &RegistrationModalProps) -> Html {
    let email = use_state(String::new);
    let username = use_state(String::new);
    let code = use_state(CodeInput::default);
    let resend_in = use_state_eq(|| 0i64);
    let delivery: Slot<Timeout> = use_mut_ref(|| None);
    let countdown: Slot<Interval> = use_mut_ref(|| None);

    let (requires_name, call_to_action) =
        props.system.read(|s| (s.config().requires_display_name, s.config().call_to_action));

    // Closing the wizard must not leave a delivery or countdown behind.
    {
        let delivery = delivery.clone();
        let countdown = countdown.clone();
        use_effect_with_deps(
            move |_| {
                move || {
                    delivery.borrow_mut().take();
                    countdown.borrow_mut().take();
                }
            },
            (),
        );
    }

    use_close_on_escape(props.on_close.clone());

    let on_email = {
        let email = email.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            email.set(input.value());
        })
    };

    let on_username = {
        let username = username.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            username.set(input.value());
        })
    };

    let on_request = {
        let system = props.system.clone();
        let on_events = props.on_events.clone();
        let email = email.clone();
        let username = username.clone();
        let code = code.clone();
        let resend_in = resend_in.clone();
        let delivery = delivery.clone();
        let countdown = countdown.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let display_name = requires_name.then(|| (*username).clone());
            let requested = system.run(&on_events, |s| {
                s.request_code(&email, display_name.as_deref(), Utc::now())
            });
            if let Ok(ticket) = requested {
                code.set(CodeInput::default());
                schedule_delivery(&delivery, system.clone(), on_events.clone(), ticket);
                start_countdown(&countdown, system.clone(), resend_in.clone());
            }
        })
    };

    let on_code = {
        let code = code.clone();
        Callback::from(move |input: CodeInput| code.set(input))
    };

    let on_verify = {
        let system = props.system.clone();
        let on_events = props.on_events.clone();
        let code = code.clone();
        let countdown = countdown.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let submitted = system.run(&on_events, |s| s.submit_code(&code.digits, Utc::now()));
            if submitted.is_ok() {
                countdown.borrow_mut().take();
            }
        })
    };

    let on_resend = {
        let system = props.system.clone();
        let on_events = props.on_events.clone();
        let code = code.clone();
        let resend_in = resend_in.clone();
        let delivery = delivery.clone();
        let countdown = countdown.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            if let Ok(ticket) = system.run(&on_events, |s| s.resend_code(Utc::now())) {
                code.set(CodeInput::default());
                schedule_delivery(&delivery, system.clone(), on_events.clone(), ticket);
                start_countdown(&countdown, system.clone(), resend_in.clone());
            }
        })
    };

    let close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };
    let keep_open = Callback::from(|e: MouseEvent| e.stop_propagation());

    let pending = props.system.read(|s| s.session().pending().cloned());

    let body = match props.step {
        Step::CollectingIdentifier => html! {
            <form class="modal-step" onsubmit={on_request}>
                <h2>{call_to_action}</h2>
                <p>{"We'll send a 6-digit code to confirm your email."}</p>
                <input
                    type="email"
                    class="modal-input"
                    placeholder="you@example.com"
                    value={(*email).clone()}
                    oninput={on_email}
                />
                if requires_name {
                    <input
                        type="text"
                        class="modal-input"
                        placeholder="Username"
                        value={(*username).clone()}
                        oninput={on_username}
                    />
                }
                <button type="submit" class="modal-button">{"Send code"}</button>
            </form>
        },
        Step::AwaitingCode => html! {
            <form class="modal-step" onsubmit={on_verify}>
                <h2>{"Check your inbox"}</h2>
                <p>
                    {"Enter the code we sent to "}
                    <strong>{pending.as_ref().map(|p| p.identifier.clone()).unwrap_or_default()}</strong>
                </p>
                <CodeEntry value={code.digits.clone()} on_input={on_code} />
                <button type="submit" class="modal-button" disabled={!code.complete}>
                    {"Verify"}
                </button>
                if *resend_in > 0 {
                    <p class="resend-wait">{format!("Resend code in {}s", *resend_in)}</p>
                } else {
                    <button type="button" class="modal-link" onclick={on_resend}>{"Resend code"}</button>
                }
            </form>
        },
        Step::Completed => html! {
            <div class="modal-step">
                <h2>{"You're in!"}</h2>
                <p class="confirmed-email">
                    {pending.as_ref().map(|p| p.identifier.clone()).unwrap_or_default()}
                </p>
                { match pending.as_ref().and_then(|p| p.display_name.clone()) {
                    Some(name) => html! { <p class="confirmed-name">{name}</p> },
                    None => html! {},
                } }
                <button class="modal-button" onclick={close.clone()}>{"Close"}</button>
            </div>
        },
    };

    html! {
        <div class="modal-overlay" onclick={close.clone()}>
            <div class="modal-content" onclick={keep_open}>
                <button class="modal-close" onclick={close}>{"×"}</button>
                {body}
            </div>
            <style>{MODAL_STYLE}</style>
        </div>
    }
}

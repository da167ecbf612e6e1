use chrono::Utc;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::auth::signup::{use_close_on_escape, SharedSignup, MODAL_STYLE};
use crate::signup::SignupEvent;

#[derive(Properties, PartialEq)]
pub struct LoginModalProps {
    pub system: SharedSignup,
    pub on_close: Callback<()>,
    pub on_events: Callback<Vec<SignupEvent>>,
}

#[function_component(LoginModal)]
pub fn login_modal(props: &LoginModalProps) -> Html {
    let email = use_state(String::new);

    use_close_on_escape(props.on_close.clone());

    let on_email = {
        let email = email.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            email.set(input.value());
        })
    };

    let on_login = {
        let system = props.system.clone();
        let on_events = props.on_events.clone();
        let on_close = props.on_close.clone();
        let email = email.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if system.run(&on_events, |s| s.log_in(&email, Utc::now())).is_ok() {
                on_close.emit(());
            }
        })
    };

    let close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };
    let keep_open = Callback::from(|e: MouseEvent| e.stop_propagation());

    html! {
        <div class="modal-overlay" onclick={close.clone()}>
            <div class="modal-content" onclick={keep_open}>
                <button class="modal-close" onclick={close}>{"×"}</button>
                <form class="modal-step" onsubmit={on_login}>
                    <h2>{"Log in"}</h2>
                    <p>{"Use the email you signed up with."}</p>
                    <input
                        type="email"
                        class="modal-input"
                        placeholder="you@example.com"
                        value={(*email).clone()}
                        oninput={on_email}
                    />
                    <button type="submit" class="modal-button">{"Log in"}</button>
                </form>
            </div>
            <style>{MODAL_STYLE}</style>
        </div>
    }
}

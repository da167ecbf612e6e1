use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use gloo_timers::callback::Timeout;
use gloo_timers::future::TimeoutFuture;
use log::{info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::auth::login::LoginModal;
use crate::auth::signup::{RegistrationModal, SharedSignup};
use crate::components::notification::{NotificationStack, ToastAction, ToastList};
use crate::config::{get_signup_config, PAYMENT_URL, PURCHASE_REDIRECT_DELAY_MS};
use crate::contact::{ContactForm, ContactMessage};
use crate::pages::faq::FaqList;
use crate::preferences::{load_preferences, save_preferences, visible_sections};
use crate::signup::growth::GrowthTimer;
use crate::signup::store::JsonStore;
use crate::signup::{LocalStorage, Notification, SignupEvent, SignupSystem};

pub struct Plan {
    pub name: &'static str,
    pub price: &'static str,
    pub period: &'static str,
    pub features: &'static [&'static str],
    pub featured: bool,
}

pub const PLANS: &[Plan] = &[
    Plan {
        name: "Basic",
        price: "€4.99",
        period: "/month",
        features: &["Live match stats", "Crosshair profiles", "Community support"],
        featured: false,
    },
    Plan {
        name: "Premium",
        price: "€9.99",
        period: "/month",
        features: &[
            "Everything in Basic",
            "Demo review tools",
            "Config sync across PCs",
            "Priority support",
        ],
        featured: true,
    },
    Plan {
        name: "Lifetime",
        price: "€79",
        period: " once",
        features: &["Everything in Premium", "All future updates", "Early access builds"],
        featured: false,
    },
];

const FEATURES: &[(&str, &str)] = &[
    ("Live stats", "Round-by-round economy, utility usage and trade kills while you play."),
    ("Profiles", "Crosshair, viewmodel and config sets you can swap between in one click."),
    ("Demo review", "Jump straight to the rounds that decided the match."),
];

pub fn purchase_message(plan: &str) -> String {
    format!("Redirecting to payment for the {} plan...", plan)
}

fn bind_input(state: &UseStateHandle<String>) -> Callback<InputEvent> {
    let state = state.clone();
    Callback::from(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        state.set(input.value());
    })
}

#[function_component(Landing)]
pub fn landing() -> Html {
    let system = use_state(|| {
        SharedSignup::new(SignupSystem::load(LocalStorage, get_signup_config(), Utc::now()))
    });
    let system = (*system).clone();
    let config = {
        let system = system.clone();
        use_memo(move |_| system.read(|s| s.config().clone()), ())
    };

    let toasts = use_reducer(ToastList::default);
    let counters = use_state_eq(|| system.read(|s| s.counters()));
    let step = use_state_eq(|| system.read(|s| s.step()));
    let modal_open = use_state(|| false);
    let login_open = use_state(|| false);

    let on_events = {
        let toasts = toasts.clone();
        let counters = counters.clone();
        let step = step.clone();
        Callback::from(move |events: Vec<SignupEvent>| {
            for event in events {
                match event {
                    SignupEvent::Notify(notification) => {
                        toasts.dispatch(ToastAction::Push(notification))
                    }
                    SignupEvent::CountersChanged(update) => counters.set(update),
                    SignupEvent::StepChanged(next) => step.set(next),
                }
            }
        })
    };

    // Growth runs for as long as the page is mounted.
    {
        let system = system.clone();
        let on_events = on_events.clone();
        let config = config.clone();
        use_effect_with_deps(
            move |_| {
                let timer = GrowthTimer::start(&config, move || {
                    system.run(&on_events, |s| s.tick_growth(Utc::now()));
                });
                move || drop(timer)
            },
            (),
        );
    }

    use_effect_with_deps(
        move |_| {
            if let Some(previous) = load_preferences(&JsonStore::new(LocalStorage)) {
                info!(
                    "Returning visitor, last seen {} ({} sections viewed)",
                    previous.last_visit,
                    previous.viewed_sections.len()
                );
            }

            let window = web_sys::window();
            let listener = Closure::wrap(Box::new(move || {
                let mut store = JsonStore::new(LocalStorage);
                let saved = save_preferences(&mut store, visible_sections(), Utc::now());
                info!("Saved preferences, {} sections in view", saved.viewed_sections.len());
            }) as Box<dyn FnMut()>);
            if let Some(window) = &window {
                let _ = window
                    .add_event_listener_with_callback("beforeunload", listener.as_ref().unchecked_ref());
            }
            move || {
                if let Some(window) = window {
                    let _ = window.remove_event_listener_with_callback(
                        "beforeunload",
                        listener.as_ref().unchecked_ref(),
                    );
                }
            }
        },
        (),
    );

    let open_modal = {
        let system = system.clone();
        let on_events = on_events.clone();
        let modal_open = modal_open.clone();
        Callback::from(move |_: MouseEvent| {
            system.run(&on_events, |s| s.reset());
            info!("Signup wizard opened");
            modal_open.set(true);
        })
    };

    let close_modal = {
        let system = system.clone();
        let on_events = on_events.clone();
        let modal_open = modal_open.clone();
        Callback::from(move |_: ()| {
            system.run(&on_events, |s| s.reset());
            info!("Signup wizard closed");
            modal_open.set(false);
        })
    };

    let open_login = {
        let login_open = login_open.clone();
        Callback::from(move |_: MouseEvent| login_open.set(true))
    };

    let close_login = {
        let login_open = login_open.clone();
        Callback::from(move |_: ()| login_open.set(false))
    };

    let on_dismiss = {
        let toasts = toasts.clone();
        Callback::from(move |id: u64| toasts.dispatch(ToastAction::Dismiss(id)))
    };

    let on_purchase = {
        let toasts = toasts.clone();
        Callback::from(move |plan: &'static str| {
            info!("Purchase started for the {} plan", plan);
            toasts.dispatch(ToastAction::Push(Notification::info(purchase_message(plan))));
            spawn_local(async move {
                TimeoutFuture::new(PURCHASE_REDIRECT_DELAY_MS).await;
                if let Some(window) = web_sys::window() {
                    if let Err(e) = window.open_with_url_and_target(PAYMENT_URL, "_blank") {
                        warn!("Could not open the payment page: {:?}", e);
                    }
                }
            });
        })
    };

    // Contact form
    let contact_name = use_state(String::new);
    let contact_email = use_state(String::new);
    let contact_message = use_state(String::new);
    let sending = use_state(|| false);
    let contact_form = use_mut_ref(ContactForm::new);
    let contact_timeout: Rc<RefCell<Option<Timeout>>> = use_mut_ref(|| None);

    {
        let contact_form = contact_form.clone();
        let contact_timeout = contact_timeout.clone();
        use_effect_with_deps(
            move |_| {
                move || {
                    contact_timeout.borrow_mut().take();
                    contact_form.borrow_mut().cancel();
                }
            },
            (),
        );
    }

    let on_message = {
        let contact_message = contact_message.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlTextAreaElement = e.target_unchecked_into();
            contact_message.set(input.value());
        })
    };

    let on_contact = {
        let toasts = toasts.clone();
        let name = contact_name.clone();
        let email = contact_email.clone();
        let message = contact_message.clone();
        let sending = sending.clone();
        let form = contact_form.clone();
        let pending = contact_timeout.clone();
        let delay = config.contact_delay_ms;
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let submission = ContactMessage {
                name: (*name).clone(),
                email: (*email).clone(),
                message: (*message).clone(),
            };
            let submitted = form.borrow_mut().submit(&submission);
            match submitted {
                Ok(ticket) => {
                    sending.set(form.borrow().is_sending());
                    let toasts = toasts.clone();
                    let name = name.clone();
                    let email = email.clone();
                    let message = message.clone();
                    let sending = sending.clone();
                    let form = form.clone();
                    let timeout = Timeout::new(delay, move || {
                        let notice = form.borrow_mut().complete(ticket);
                        if let Some(notice) = notice {
                            name.set(String::new());
                            email.set(String::new());
                            message.set(String::new());
                            sending.set(form.borrow().is_sending());
                            toasts.dispatch(ToastAction::Push(notice));
                        }
                    });
                    *pending.borrow_mut() = Some(timeout);
                }
                Err(e) => toasts.dispatch(ToastAction::Push(Notification::error(e.to_string()))),
            }
        })
    };

    let running_low = system.read(|s| s.ledger().snapshot().slots_running_low());
    let registered_today = system.read(|s| s.registry().stats(Utc::now()).registered_today);

    html! {
        <div class="landing-page">
            <NotificationStack toasts={toasts.toasts.clone()} {on_dismiss} />

            <header id="home" class="hero">
                <div class="hero-content">
                    <h1>{"CS2 External"}</h1>
                    <p class="hero-subtitle">
                        {"Stats, profiles and demo review for Counter-Strike 2, in a window of its own."}
                    </p>
                    <div class="hero-actions">
                        <button class="hero-cta" onclick={open_modal.clone()}>
                            {config.call_to_action}
                        </button>
                        <button class="hero-secondary" onclick={open_login}>{"Log in"}</button>
                    </div>
                </div>
            </header>

            <section id="features" class="features-section">
                <h2>{"Features"}</h2>
                <div class="features-grid">
                    { for FEATURES.iter().map(|(title, text)| html! {
                        <div class="feature-card">
                            <h3>{*title}</h3>
                            <p>{*text}</p>
                        </div>
                    }) }
                </div>
            </section>

            <section class="live-counters">
                <div class="counter">
                    <span class="counter-value">{counters.registered_count.to_string()}</span>
                    <span class="counter-label">{format!("{} registered", config.member_noun)}</span>
                </div>
                <div class={classes!("counter", running_low.then(|| "low-slots"))}>
                    <span class="counter-value">{counters.remaining_slots.to_string()}</span>
                    <span class="counter-label">{"slots left"}</span>
                </div>
                <div class="counter">
                    <span class="counter-value">{registered_today.to_string()}</span>
                    <span class="counter-label">{"joined today"}</span>
                </div>
                <button class="hero-cta" onclick={open_modal}>{config.call_to_action}</button>
            </section>

            <section id="pricing" class="pricing-section">
                <h2>{"Pricing"}</h2>
                <div class="pricing-grid">
                    { for PLANS.iter().map(|plan| {
                        let onclick = {
                            let on_purchase = on_purchase.clone();
                            let name = plan.name;
                            Callback::from(move |_: MouseEvent| on_purchase.emit(name))
                        };
                        html! {
                            <div class={classes!("pricing-card", plan.featured.then(|| "featured"))}>
                                <h3>{plan.name}</h3>
                                <p class="price">{plan.price}<span class="period">{plan.period}</span></p>
                                <ul>
                                    { for plan.features.iter().map(|feature| html! { <li>{*feature}</li> }) }
                                </ul>
                                <button class="btn" {onclick}>{"Choose plan"}</button>
                            </div>
                        }
                    }) }
                </div>
            </section>

            <section id="faq" class="faq-section">
                <h2>{"FAQ"}</h2>
                <FaqList />
            </section>

            <section id="contact" class="contact-section">
                <h2>{"Contact"}</h2>
                <form class="contact-form" onsubmit={on_contact}>
                    <input
                        type="text"
                        placeholder="Name"
                        value={(*contact_name).clone()}
                        oninput={bind_input(&contact_name)}
                    />
                    <input
                        type="email"
                        placeholder="Email"
                        value={(*contact_email).clone()}
                        oninput={bind_input(&contact_email)}
                    />
                    <textarea
                        placeholder="Message"
                        value={(*contact_message).clone()}
                        oninput={on_message}
                    />
                    <button type="submit" class="btn" disabled={*sending}>
                        {if *sending { "Sending..." } else { "Send message" }}
                    </button>
                </form>
            </section>

            if *modal_open {
                <RegistrationModal
                    system={system.clone()}
                    step={*step}
                    on_close={close_modal}
                    on_events={on_events.clone()}
                />
            }
            if *login_open {
                <LoginModal
                    system={system.clone()}
                    on_close={close_login}
                    on_events={on_events.clone()}
                />
            }

            <style>
                {r#"
                .landing-page {
                    color: #fff;
                    background: #0f0f12;
                    min-height: 100vh;
                }
                .landing-page section {
                    padding: 5rem 2rem;
                    max-width: 1100px;
                    margin: 0 auto;
                }
                .landing-page h2 {
                    text-align: center;
                    font-size: 2.2rem;
                    margin-bottom: 2.5rem;
                }
                .hero {
                    min-height: 90vh;
                    display: flex;
                    align-items: center;
                    justify-content: center;
                    text-align: center;
                    padding: 74px 2rem 0;
                }
                .hero h1 {
                    font-size: 4rem;
                    background: linear-gradient(45deg, #fff, #8B5CF6);
                    -webkit-background-clip: text;
                    -webkit-text-fill-color: transparent;
                }
                .hero-subtitle {
                    color: #bbb;
                    font-size: 1.3rem;
                    margin: 1.5rem 0 2.5rem;
                }
                .hero-cta, .btn {
                    padding: 1rem 2.5rem;
                    border: none;
                    border-radius: 8px;
                    background: linear-gradient(45deg, #8B5CF6, #6D28D9);
                    color: #fff;
                    font-weight: 600;
                    font-size: 1rem;
                    cursor: pointer;
                }
                .hero-actions {
                    display: flex;
                    justify-content: center;
                    gap: 1rem;
                }
                .hero-secondary {
                    padding: 1rem 2.5rem;
                    border: 1px solid #8B5CF6;
                    border-radius: 8px;
                    background: none;
                    color: #fff;
                    font-weight: 600;
                    font-size: 1rem;
                    cursor: pointer;
                }
                .btn:disabled {
                    opacity: 0.6;
                    cursor: not-allowed;
                }
                .features-grid, .pricing-grid {
                    display: grid;
                    grid-template-columns: repeat(auto-fit, minmax(260px, 1fr));
                    gap: 2rem;
                }
                .feature-card, .pricing-card {
                    background: rgba(30, 30, 30, 0.7);
                    border: 1px solid rgba(139, 92, 246, 0.2);
                    border-radius: 16px;
                    padding: 2rem;
                }
                .pricing-card.featured {
                    border-color: #8B5CF6;
                    transform: scale(1.03);
                }
                .pricing-card ul {
                    list-style: none;
                    padding: 0;
                    margin: 1.5rem 0;
                    color: #bbb;
                }
                .price {
                    font-size: 2.5rem;
                    font-weight: 700;
                }
                .period {
                    font-size: 1rem;
                    color: #999;
                }
                .live-counters {
                    display: flex;
                    flex-wrap: wrap;
                    justify-content: center;
                    align-items: center;
                    gap: 3rem;
                }
                .counter {
                    display: flex;
                    flex-direction: column;
                    align-items: center;
                }
                .counter-value {
                    font-size: 3rem;
                    font-weight: 700;
                    color: #8B5CF6;
                }
                .counter.low-slots .counter-value {
                    color: #EF4444;
                }
                .counter-label {
                    color: #999;
                }
                .contact-form {
                    display: flex;
                    flex-direction: column;
                    gap: 1rem;
                    max-width: 600px;
                    margin: 0 auto;
                }
                .contact-form input, .contact-form textarea {
                    padding: 0.9rem 1rem;
                    border-radius: 8px;
                    border: 1px solid rgba(139, 92, 246, 0.3);
                    background: rgba(0, 0, 0, 0.4);
                    color: #fff;
                    font-size: 1rem;
                }
                .contact-form textarea {
                    min-height: 140px;
                }
                @media (max-width: 768px) {
                    .hero h1 {
                        font-size: 2.6rem;
                    }
                }
                "#}
            </style>
        </div>
    }
}

use yew::prelude::*;
use yew_router::prelude::*;
use log::{info, Level};
use web_sys::MouseEvent;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

mod config;
mod contact;
mod preferences;
mod signup;
mod components {
    pub mod notification;
}
mod auth {
    pub mod login;
    pub mod signup;
    pub mod verify;
}
mod pages {
    pub mod export;
    pub mod faq;
    pub mod landing;
}

use pages::{export::Export, faq::Faq, landing::Landing};

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/faq")]
    Faq,
    #[at("/admin/export")]
    Export,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Home => {
            info!("Rendering Home page");
            html! { <Landing /> }
        },
        Route::Faq => {
            info!("Rendering FAQ page");
            html! { <Faq /> }
        },
        Route::Export => {
            info!("Rendering Export page");
            html! { <Export /> }
        },
        Route::NotFound => html! {
            <div class="not-found">
                <h1>{"Page not found"}</h1>
                <Link<Route> to={Route::Home}>{"Back to the home page"}</Link<Route>>
            </div>
        },
    }
}

const SCROLLED_THRESHOLD_PX: i32 = 100;

#[function_component(Nav)]
pub fn nav() -> Html {
    let menu_open = use_state(|| false);
    let is_scrolled = use_state_eq(|| false);

    {
        let is_scrolled = is_scrolled.clone();
        use_effect_with_deps(move |_| {
            let window = web_sys::window();
            let document = window.as_ref().and_then(|w| w.document());

            let scroll_callback = Closure::wrap(Box::new(move || {
                let scroll_top = document
                    .as_ref()
                    .and_then(|d| d.document_element())
                    .map_or(0, |e| e.scroll_top());
                is_scrolled.set(scroll_top > SCROLLED_THRESHOLD_PX);
            }) as Box<dyn FnMut()>);

            if let Some(window) = &window {
                let _ = window.add_event_listener_with_callback("scroll", scroll_callback.as_ref().unchecked_ref());
            }

            move || {
                if let Some(window) = window {
                    let _ = window.remove_event_listener_with_callback("scroll", scroll_callback.as_ref().unchecked_ref());
                }
            }
        }, ());
    }

    let toggle_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            menu_open.set(!*menu_open);
        })
    };

    // Section links must still navigate, so no prevent_default here.
    let close_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| menu_open.set(false))
    };

    let menu_class = if *menu_open {
        "nav-right mobile-menu-open"
    } else {
        "nav-right"
    };

    html! {
        <nav class={classes!("top-nav", (*is_scrolled).then(|| "scrolled"))}>
            <div class="nav-content">
                <Link<Route> to={Route::Home} classes="nav-logo">
                    {"CS2 External"}
                </Link<Route>>

                <button class="burger-menu" onclick={toggle_menu}>
                    <span></span>
                    <span></span>
                    <span></span>
                </button>
                <div class={menu_class} onclick={close_menu}>
                    <a href="/#features" class="nav-link">{"Features"}</a>
                    <a href="/#pricing" class="nav-link">{"Pricing"}</a>
                    <Link<Route> to={Route::Faq} classes="nav-link">{"FAQ"}</Link<Route>>
                    <a href="/#contact" class="nav-link">{"Contact"}</a>
                </div>
            </div>
            <style>
                {r#"
                .top-nav {
                    position: fixed;
                    top: 0;
                    width: 100%;
                    z-index: 1000;
                    transition: background 0.3s ease;
                }
                .top-nav.scrolled {
                    background: rgba(15, 15, 18, 0.95);
                    box-shadow: 0 2px 20px rgba(0, 0, 0, 0.4);
                }
                .nav-content {
                    max-width: 1200px;
                    margin: 0 auto;
                    padding: 1.2rem 2rem;
                    display: flex;
                    justify-content: space-between;
                    align-items: center;
                }
                .nav-logo {
                    color: #fff;
                    font-weight: 700;
                    font-size: 1.3rem;
                    text-decoration: none;
                }
                .nav-right {
                    display: flex;
                    gap: 2rem;
                }
                .nav-link {
                    color: #ccc;
                    text-decoration: none;
                }
                .nav-link:hover {
                    color: #8B5CF6;
                }
                .burger-menu {
                    display: none;
                    flex-direction: column;
                    gap: 5px;
                    background: none;
                    border: none;
                    cursor: pointer;
                }
                .burger-menu span {
                    width: 24px;
                    height: 2px;
                    background: #fff;
                }
                @media (max-width: 768px) {
                    .burger-menu {
                        display: flex;
                    }
                    .nav-right {
                        display: none;
                    }
                    .nav-right.mobile-menu-open {
                        display: flex;
                        flex-direction: column;
                        position: absolute;
                        top: 100%;
                        left: 0;
                        right: 0;
                        padding: 1.5rem 2rem;
                        background: rgba(15, 15, 18, 0.98);
                    }
                }
                "#}
            </style>
        </nav>
    }
}

#[function_component]
fn App() -> Html {
    html! {
        <BrowserRouter>
            <Nav />
            <Switch<Route> render={switch} />
        </BrowserRouter>
    }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(Level::Info).expect("error initializing log");

    info!("Starting application");
    yew::Renderer::<App>::new().render();
}

use yew::prelude::*;
use web_sys::MouseEvent;

pub const FAQ_ITEMS: &[(&str, &str)] = &[
    (
        "What is CS2 External?",
        "A desktop companion for Counter-Strike 2 that runs in its own window next to the game: live match stats, crosshair and config profiles, and demo review tools.",
    ),
    (
        "How do I get into the beta?",
        "Press \"Join the beta\", enter your email and a username, then confirm the 6-digit code. Beta slots are limited and the counter on this page shows how many are left.",
    ),
    (
        "Which systems are supported?",
        "Windows 10 and 11, 64-bit. A Linux build is planned once the beta settles.",
    ),
    (
        "Can I switch or cancel my plan?",
        "Yes. Monthly plans can be cancelled at any time from your account page and stay active until the end of the paid period.",
    ),
    (
        "How do I reach support?",
        "Use the contact form at the bottom of the page. We usually answer within a day.",
    ),
];

/// At most one answer open. Opening a question closes the others, clicking
/// the open one closes it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FaqAccordion {
    open: Option<usize>,
}

impl FaqAccordion {
    pub fn toggle(self, index: usize) -> Self {
        if self.open == Some(index) {
            Self { open: None }
        } else {
            Self { open: Some(index) }
        }
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open == Some(index)
    }
}

#[derive(Properties, PartialEq)]
struct FaqItemProps {
    question: String,
    answer: String,
    is_open: bool,
    on_toggle: Callback<()>,
}

#[function_component(FaqItem)]
fn faq_item(props: &FaqItemProps) -> Html {
    let toggle = {
        let on_toggle = props.on_toggle.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            on_toggle.emit(());
        })
    };

    html! {
        <div class={classes!("faq-item", props.is_open.then(|| "active"))}>
            <button class="faq-question" onclick={toggle}>
                <span class="question-text">{&props.question}</span>
                <span class="toggle-icon">{if props.is_open { "−" } else { "+" }}</span>
            </button>
            <div class="faq-answer">
                <p>{&props.answer}</p>
            </div>
        </div>
    }
}

#[function_component(FaqList)]
pub fn faq_list() -> Html {
    let accordion = use_state(FaqAccordion::default);

    html! {
        <div class="faq-list">
            { for FAQ_ITEMS.iter().enumerate().map(|(index, (question, answer))| {
                let on_toggle = {
                    let accordion = accordion.clone();
                    Callback::from(move |_: ()| accordion.set(accordion.toggle(index)))
                };
                html! {
                    <FaqItem
                        question={question.to_string()}
                        answer={answer.to_string()}
                        is_open={accordion.is_open(index)}
                        {on_toggle}
                    />
                }
            }) }
            <style>
                {r#"
                .faq-list {
                    max-width: 800px;
                    margin: 0 auto;
                }
                .faq-item {
                    border: 1px solid rgba(139, 92, 246, 0.2);
                    border-radius: 8px;
                    margin-bottom: 1rem;
                    background: rgba(20, 20, 20, 0.8);
                    overflow: hidden;
                }
                .faq-question {
                    width: 100%;
                    display: flex;
                    justify-content: space-between;
                    align-items: center;
                    padding: 1.25rem 1.5rem;
                    background: none;
                    border: none;
                    color: #fff;
                    font-size: 1.1rem;
                    cursor: pointer;
                    text-align: left;
                }
                .faq-answer {
                    max-height: 0;
                    overflow: hidden;
                    transition: max-height 0.3s ease;
                    padding: 0 1.5rem;
                    color: #bbb;
                }
                .faq-item.active .faq-answer {
                    max-height: 400px;
                    padding-bottom: 1.25rem;
                }
                "#}
            </style>
        </div>
    }
}

#[function_component(Faq)]
pub fn faq() -> Html {
    html! {
        <div class="faq-page">
            <section class="faq-hero">
                <h1>{"Frequently Asked Questions"}</h1>
                <p>{"Everything about CS2 External, the beta and your plan"}</p>
            </section>
            <section class="faq-section">
                <FaqList />
            </section>
            <style>
                {r#"
                .faq-page {
                    padding-top: 74px;
                    min-height: 100vh;
                    color: #ffffff;
                }
                .faq-hero {
                    text-align: center;
                    padding: 6rem 2rem 3rem;
                }
                .faq-hero h1 {
                    font-size: 3rem;
                    margin-bottom: 1.5rem;
                    background: linear-gradient(45deg, #fff, #8B5CF6);
                    -webkit-background-clip: text;
                    -webkit-text-fill-color: transparent;
                }
                .faq-hero p {
                    font-size: 1.2rem;
                    color: #999;
                }
                .faq-section {
                    padding: 2rem;
                }
                "#}
            </style>
        </div>
    }
}

use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::signup::verification::{sanitize_code_input, CodeInput, CODE_LENGTH};

#[derive(Properties, PartialEq)]
pub struct CodeEntryProps {
    pub value: String,
    pub on_input: Callback<CodeInput>,
    #[prop_or_default]
    pub disabled: bool,
}

/// Six digit code field. Typed and pasted text go through the same cleanup,
/// so there is no `maxlength` cutting a paste short before it is filtered.
#[function_component(CodeEntry)]
pub fn code_entry(props: &CodeEntryProps) -> Html {
    let oninput = {
        let on_input = props.on_input.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let cleaned = sanitize_code_input(&input.value());
            if cleaned.digits != input.value() {
                input.set_value(&cleaned.digits);
            }
            on_input.emit(cleaned);
        })
    };

    html! {
        <input
            type="text"
            class="code-input"
            inputmode="numeric"
            autocomplete="one-time-code"
            placeholder={"0".repeat(CODE_LENGTH)}
            value={props.value.clone()}
            disabled={props.disabled}
            {oninput}
        />
    }
}

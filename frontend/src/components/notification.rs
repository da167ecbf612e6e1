use std::rc::Rc;

use gloo_timers::callback::Timeout;
use yew::prelude::*;

use crate::config::NOTIFICATION_TTL_MS;
use crate::signup::Notification;

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub notification: Notification,
}

/// Notifications currently on screen, oldest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToastList {
    next_id: u64,
    pub toasts: Vec<Toast>,
}

pub enum ToastAction {
    Push(Notification),
    Dismiss(u64),
}

impl Reducible for ToastList {
    type Action = ToastAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            ToastAction::Push(notification) => {
                next.toasts.push(Toast { id: next.next_id, notification });
                next.next_id += 1;
            }
            ToastAction::Dismiss(id) => next.toasts.retain(|toast| toast.id != id),
        }
        Rc::new(next)
    }
}

#[derive(Properties, PartialEq)]
pub struct NotificationStackProps {
    pub toasts: Vec<Toast>,
    pub on_dismiss: Callback<u64>,
}

#[function_component(NotificationStack)]
pub fn notification_stack(props: &NotificationStackProps) -> Html {
    html! {
        <div class="notification-stack">
            <style>
                {r#"
                    .notification-stack {
                        position: fixed;
                        top: 20px;
                        right: 20px;
                        display: flex;
                        flex-direction: column;
                        gap: 0.75rem;
                        z-index: 10000;
                    }
                    .notification {
                        padding: 1rem 2rem;
                        border-radius: 8px;
                        color: white;
                        font-weight: 600;
                        cursor: pointer;
                        animation: notificationIn 0.3s ease;
                        max-width: 360px;
                    }
                    .notification-success { background-color: #10B981; }
                    .notification-error { background-color: #EF4444; }
                    .notification-info { background-color: #8B5CF6; }
                    @keyframes notificationIn {
                        from { transform: translateX(400px); }
                        to { transform: translateX(0); }
                    }
                "#}
            </style>
            { for props.toasts.iter().map(|toast| html! {
                <ToastView key={toast.id} toast={toast.clone()} on_dismiss={props.on_dismiss.clone()} />
            }) }
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct ToastProps {
    toast: Toast,
    on_dismiss: Callback<u64>,
}

#[function_component(ToastView)]
fn toast_view(props: &ToastProps) -> Html {
    let id = props.toast.id;

    {
        let on_dismiss = props.on_dismiss.clone();
        use_effect_with_deps(
            move |id| {
                let id = *id;
                let timeout = Timeout::new(NOTIFICATION_TTL_MS, move || on_dismiss.emit(id));
                move || drop(timeout)
            },
            id,
        );
    }

    let onclick = {
        let on_dismiss = props.on_dismiss.clone();
        Callback::from(move |_: MouseEvent| on_dismiss.emit(id))
    };

    html! {
        <div class={classes!("notification", props.toast.notification.kind.css_class())} {onclick}>
            {&props.toast.notification.message}
        </div>
    }
}

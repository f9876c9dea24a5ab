use super::super::Model;
use gloo_file::File as GlooFile;
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::FileList;
use yew::prelude::*;

// Debounce function to limit button events
pub fn debounce<F>(duration: u32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));

    Callback::from(move |_| {
        let mut timeout_ref = timeout.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        *timeout_ref = Some(Timeout::new(duration, move || inner_callback()));
    })
}

/// Only one image is handled at a time; anything after the first image in
/// the list is ignored.
pub fn first_image_file(file_list: &FileList) -> Option<GlooFile> {
    let mut skipped = Vec::new();
    let found = (0..file_list.length())
        .filter_map(|i| file_list.item(i))
        .find(|file| {
            let is_image = file.type_().starts_with("image/");
            if !is_image {
                skipped.push(file.name());
            }
            is_image
        })
        .map(GlooFile::from);

    for name in skipped {
        log::warn!("Skipping non-image file: {}", name);
    }
    found
}

pub fn render_error_message(model: &Model) -> Html {
    let messages: Vec<&str> = [model.session.capture_error(), model.session.error_message()]
        .into_iter()
        .flatten()
        .collect();

    html! {
        <>
            { for messages.into_iter().map(|message| html! {
                <div class="error-message">
                    <i class="fa-solid fa-circle-exclamation"></i>
                    <p>{ message }</p>
                </div>
            })}
        </>
    }
}

//! Navigation: smooth scrolling to sections and the active-link highlight.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, ScrollBehavior, ScrollToOptions, Window};

use crate::config::{ElementIds, NavConfig};
use crate::dom;
use crate::error::Result;

/// Section id a link points at: its `href` without the leading `#`.
pub fn target_id(href: &str) -> &str {
    href.chars().next().map_or("", |c| &href[c.len_utf8()..])
}

/// Scroll position that puts a section just below the fixed header.
pub fn scroll_top(section_top: f64, header_height: f64) -> f64 {
    section_top - header_height
}

/// Link to highlight on page load.
///
/// With a fragment, only a link whose `href` is exactly `#fragment` matches.
/// Without one, the default section's link is used.
pub fn initial_active<'a, I>(hrefs: I, fragment: &str, default_section: &str) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let section = if fragment.is_empty() {
        default_section
    } else {
        fragment
    };
    let wanted = format!("#{section}");
    hrefs.into_iter().position(|href| href == wanted)
}

/// Which navigation link is highlighted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavState {
    active: Option<usize>,
}

impl NavState {
    pub fn new(active: Option<usize>) -> Self {
        Self { active }
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn activate(&mut self, index: usize) {
        self.active = Some(index);
    }

    /// Per-link highlight flags for `len` links.
    pub fn flags(&self, len: usize) -> Vec<bool> {
        (0..len).map(|i| self.active == Some(i)).collect()
    }
}

struct NavLinks {
    links: Vec<Element>,
    state: NavState,
    active_class: String,
}

impl NavLinks {
    fn render(&self) -> Result<()> {
        for (link, on) in self.links.iter().zip(self.state.flags(self.links.len())) {
            if on {
                link.class_list().add_1(&self.active_class)?;
            } else {
                link.class_list().remove_1(&self.active_class)?;
            }
        }
        Ok(())
    }
}

/// Wire click handlers on every navigation link and set the initial highlight.
pub fn install(window: &Window, document: &Document, ids: &ElementIds, config: &NavConfig) -> Result<()> {
    let links = dom::query_all(document, &ids.nav_link_selector)?;
    let hrefs: Vec<String> = links
        .iter()
        .map(|link| link.get_attribute("href").unwrap_or_default())
        .collect();

    let hash = window.location().hash()?;
    let fragment = target_id(&hash);
    let active = initial_active(hrefs.iter().map(String::as_str), fragment, &config.default_section);

    let nav = Rc::new(RefCell::new(NavLinks {
        links: links.clone(),
        state: NavState::new(active),
        active_class: config.active_class.clone(),
    }));
    nav.borrow().render()?;

    for (index, link) in links.iter().enumerate() {
        let nav = nav.clone();
        let window = window.clone();
        let document = document.clone();
        let header_selector = ids.header_selector.clone();
        let href = hrefs[index].clone();
        dom::listen(link, "click", move |event| {
            event.prevent_default();
            scroll_to_section(&window, &document, target_id(&href), &header_selector);

            let mut nav = nav.borrow_mut();
            nav.state.activate(index);
            if let Err(e) = nav.render() {
                log::warn!("failed to update navigation highlight: {e}");
            }
        })?;
    }
    log::debug!("navigation wired for {} links", links.len());
    Ok(())
}

fn scroll_to_section(window: &Window, document: &Document, id: &str, header_selector: &str) {
    let Some(section) = document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };
    let header_height = document
        .query_selector(header_selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .map_or(0.0, |header| f64::from(header.offset_height()));

    let options = ScrollToOptions::new();
    options.set_top(scroll_top(f64::from(section.offset_top()), header_height));
    options.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
}

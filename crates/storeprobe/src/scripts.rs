//! Injected script vocabulary.
//!
//! Every script the core sends through
//! [`BrowserSession::execute_script`](crate::session::BrowserSession::execute_script)
//! or `execute_on` is one of these bodies. Values always travel as arguments,
//! never concatenated into the source.

/// `arguments[0]`: element, `arguments[1]`: text.
///
/// Direct property assignment followed by bubbling `input` and `change`
/// events, so the application's own listeners run.
pub const SET_VALUE: &str = "arguments[0].value = arguments[1];\
arguments[0].dispatchEvent(new Event('input', { bubbles: true }));\
arguments[0].dispatchEvent(new Event('change', { bubbles: true }));\
return null;";

/// `arguments[0]`: CSS selector.
///
/// Present and rendered: computed `visibility` is not `hidden` (it inherits),
/// and neither the element nor any ancestor has `display: none` or
/// `opacity: 0` (those do not inherit).
pub const IS_VISIBLE: &str = "let el = document.querySelector(arguments[0]);\
if (!el || !el.isConnected) return false;\
if (window.getComputedStyle(el).visibility === 'hidden') return false;\
for (; el; el = el.parentElement) {\
const s = window.getComputedStyle(el);\
if (s.display === 'none' || s.opacity === '0') return false;\
}\
return true;";

/// `arguments[0]`: element. The [`IS_VISIBLE`] rule for a resolved element.
pub const ELEMENT_DISPLAYED: &str = "let el = arguments[0];\
if (!el.isConnected) return false;\
if (window.getComputedStyle(el).visibility === 'hidden') return false;\
for (; el; el = el.parentElement) {\
const s = window.getComputedStyle(el);\
if (s.display === 'none' || s.opacity === '0') return false;\
}\
return true;";

/// `arguments[0]`: `<select>` element, `arguments[1]`: option text.
///
/// Returns `false` when no option carries that visible text.
pub const SELECT_BY_TEXT: &str = "const sel = arguments[0];\
const opt = Array.from(sel.options).find(o => o.text.trim() === arguments[1]);\
if (!opt) return false;\
sel.value = opt.value;\
opt.selected = true;\
sel.dispatchEvent(new Event('input', { bubbles: true }));\
sel.dispatchEvent(new Event('change', { bubbles: true }));\
return true;";

/// Document finished loading
pub const DOCUMENT_READY: &str = "return document.readyState === 'complete';";

/// `arguments[0]`: key, `arguments[1]`: already-serialised value
pub const STORAGE_SET: &str = "localStorage.setItem(arguments[0], arguments[1]); return null;";

/// `arguments[0]`: key. Returns the raw string or `null`.
pub const STORAGE_GET: &str = "return localStorage.getItem(arguments[0]);";

/// `arguments[0]`: key
pub const STORAGE_REMOVE: &str = "localStorage.removeItem(arguments[0]); return null;";

/// All scripts, for sessions that interpret the vocabulary directly
pub const ALL: [&str; 8] = [
    SET_VALUE,
    IS_VISIBLE,
    ELEMENT_DISPLAYED,
    SELECT_BY_TEXT,
    DOCUMENT_READY,
    STORAGE_SET,
    STORAGE_GET,
    STORAGE_REMOVE,
];

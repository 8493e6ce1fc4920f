//! User-selected files.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a file chosen by the user.
pub type FileRef = Rc<dyn FileBlob>;

/// A file picked through the file input or dropped on the page.
///
/// The content stays inside the backend (a `web_sys::File` in the browser,
/// a byte buffer in the headless backend). Backends that need the concrete
/// type, such as an upload transport, downcast through [`FileBlob::as_any`].
pub trait FileBlob {
    /// File name as reported by the browser.
    fn name(&self) -> String;
    /// Declared media type, e.g. `image/png`. May be empty.
    fn media_type(&self) -> String;
    /// Size in bytes.
    fn size(&self) -> u64;
    fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn FileBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileBlob")
            .field("name", &self.name())
            .field("media_type", &self.media_type())
            .field("size", &self.size())
            .finish()
    }
}

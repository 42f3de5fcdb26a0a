/*!
 * EPUB container handling.
 *
 * - `archive`: unpack a book into a workspace directory and repack it
 * - `metadata`: locate the package document and read/write its
 *   title and language fields
 */

pub mod archive;
pub mod metadata;

pub use self::archive::{repack, unpack};
pub use self::metadata::{locate_package_document, read_field, write_field, MetadataField};

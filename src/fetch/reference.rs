// SPDX-License-Identifier: MPL-2.0
//! Parsing of the reference a viewer is asked to load.

use std::fmt;

/// Extensions of archives holding a frame series.
const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "cbz"];

/// Filename used when a location has no usable last segment.
const FALLBACK_FILENAME: &str = "download";

/// What to load: an archive of frames, or one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Archive {
        location: String,
    },
    Single {
        location: String,
        /// Name used to classify the image when its content is ambiguous.
        filename: String,
    },
}

impl Reference {
    /// Classifies a location by the extension of its last path segment.
    ///
    /// # Example
    ///
    /// ```
    /// use scanlens::fetch::Reference;
    ///
    /// let reference = Reference::parse("https://host/studies/ct.zip?token=abc");
    /// assert!(reference.is_archive());
    ///
    /// let reference = Reference::parse("https://host/frames/IM0001");
    /// assert_eq!(reference.filename(), "IM0001");
    /// ```
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        let filename = filename_of(location);
        let is_archive = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .is_some_and(|ext| ARCHIVE_EXTENSIONS.contains(&ext.as_str()));

        if is_archive {
            Reference::Archive {
                location: location.to_owned(),
            }
        } else {
            Reference::Single {
                location: location.to_owned(),
                filename,
            }
        }
    }

    /// A single image with an explicit filename.
    #[must_use]
    pub fn single(location: impl Into<String>, filename: impl Into<String>) -> Self {
        Reference::Single {
            location: location.into(),
            filename: filename.into(),
        }
    }

    #[must_use]
    pub fn archive(location: impl Into<String>) -> Self {
        Reference::Archive {
            location: location.into(),
        }
    }

    #[must_use]
    pub fn location(&self) -> &str {
        match self {
            Reference::Archive { location } | Reference::Single { location, .. } => location,
        }
    }

    /// Returns the name the frames are classified and labelled by.
    #[must_use]
    pub fn filename(&self) -> String {
        match self {
            Reference::Archive { location } => filename_of(location),
            Reference::Single { filename, .. } => filename.clone(),
        }
    }

    #[must_use]
    pub fn is_archive(&self) -> bool {
        matches!(self, Reference::Archive { .. })
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.location())
    }
}

/// Last path segment with query and fragment removed.
fn filename_of(location: &str) -> String {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or(location);
    let segment = path
        .rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or("");

    if segment.is_empty() || segment.contains(':') {
        FALLBACK_FILENAME.to_owned()
    } else {
        segment.to_owned()
    }
}

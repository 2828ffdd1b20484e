use serde::Serialize;

/// One entry of the host mount table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountRecord {
    pub device:      String,
    pub mount_point: String,
    pub fs_type:     String,
    /// Mount options ("rw", "relatime", ...), empty when the table omits them.
    pub options:     Vec<String>,
}

impl MountRecord {
    pub fn new(device: impl Into<String>, mount_point: impl Into<String>, fs_type: impl Into<String>) -> Self {
        Self {
            device:      device.into(),
            mount_point: mount_point.into(),
            fs_type:     fs_type.into(),
            options:     Vec::new(),
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the short device name ("sda1" from "/dev/sda1").
    pub fn short_device(&self) -> &str {
        self.device.trim_start_matches("/dev/").trim_start_matches("mapper/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_device_strips_prefixes() {
        let m = MountRecord::new("/dev/mapper/vg0-root", "/", "xfs");
        assert_eq!(m.short_device(), "vg0-root");
        let m = MountRecord::new("tmpfs", "/run", "tmpfs");
        assert_eq!(m.short_device(), "tmpfs");
    }
}

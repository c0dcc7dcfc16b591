use log::info;
use std::io;
use std::path::Path;

/// Width of the `HHMM` time fields in API items and archive rows.
const TIME_FIELD_WIDTH: usize = 4;

/// Left-pads an `HHMM` time field with zeros: `"200"` becomes `"0200"`.
/// Values that are already four characters or longer are returned trimmed.
pub(crate) fn zero_pad_time(value: &str) -> String {
    format!("{:0>width$}", value.trim(), width = TIME_FIELD_WIDTH)
}

pub(crate) async fn ensure_dir_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("Path exists but is not a directory: {}", path.display()),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating archive directory: {}", path.display());
            tokio::fs::create_dir_all(path).await
        }
        Err(e) => Err(e),
    }
}

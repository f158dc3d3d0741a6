use std::path::Path;

use fsdiff_storage::load_header;

use crate::error::CliError;
use crate::report::human_size;

pub fn run(snapshot: &Path, json: bool) -> Result<(), CliError> {
    let header = load_header(snapshot)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&header)?);
        return Ok(());
    }

    let info = &header.system_info;
    println!("Snapshot:     {}", snapshot.display());
    println!("Format:       {}", header.format_version);
    println!("Created:      {}", header.created.to_rfc3339());
    println!("Scan root:    {}", info.scan_root);
    println!("Host:         {} ({} {}, kernel {})", info.hostname, info.distro, info.arch, info.kernel);
    println!("Files:        {}", header.stats.file_count);
    println!("Directories:  {}", header.stats.dir_count);
    println!("Total size:   {}", human_size(header.stats.total_size));
    println!("Errors:       {}", header.stats.error_count);
    println!("Scan time:    {:.1}s", header.stats.scan_duration.as_secs_f64());
    println!("Root digest:  {}", header.root_digest);
    Ok(())
}

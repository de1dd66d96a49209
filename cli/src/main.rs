//! `isoread`: inspect ISO9660 images and pull files out of them

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use iso9660::source::FileImage;
use iso9660::utils::datetime::DateTime7;
use iso9660::volume::VolumeDescriptor;
use iso9660::{
    extract_to, extract_to_dir, find_file, list_directory, mount, walk_all, DirectoryRecord,
    ImageSource, VolumeInfo,
};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "isoread", version, about = "Read ISO9660 images")]
struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the volume descriptors
    Info {
        /// Image file
        image: PathBuf,
    },
    /// List one directory
    Ls {
        /// Image file
        image: PathBuf,
        /// Directory inside the image
        #[arg(default_value = "/")]
        path: String,
    },
    /// Print the whole hierarchy
    Tree {
        /// Image file
        image: PathBuf,
    },
    /// Extract one file
    Extract {
        /// Image file
        image: PathBuf,
        /// File inside the image
        path: String,
        /// Destination directory; raw bytes go to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Info { image } => info(&image),
        Command::Ls { image, path } => ls(&image, &path),
        Command::Tree { image } => tree(&image),
        Command::Extract {
            image,
            path,
            output,
        } => extract(&image, &path, output.as_deref()),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn open(image: &Path) -> Result<(ImageSource<FileImage>, VolumeInfo)> {
    let mut source = ImageSource::open(image)
        .with_context(|| format!("failed to open {}", image.display()))?;
    let volume = mount(&mut source)
        .with_context(|| format!("failed to read volume descriptors of {}", image.display()))?;
    log::debug!(
        "mounted {}: root extent {} ({} bytes, {:?})",
        image.display(),
        volume.root.extent_lba,
        volume.root.data_length,
        volume.root.encoding
    );
    Ok((source, volume))
}

fn info(image: &Path) -> Result<()> {
    let (_, volume) = open(image)?;

    println!("Volume ID:        {}", volume.volume_id);
    println!("System ID:        {}", volume.system_id);
    println!("Volume set ID:    {}", volume.volume_set_id);
    println!("Publisher:        {}", volume.publisher_id);
    println!("Data preparer:    {}", volume.data_preparer_id);
    println!("Application:      {}", volume.application_id);
    println!("Block size:       {}", volume.logical_block_size);
    println!(
        "Volume size:      {} blocks ({} bytes)",
        volume.volume_space_size,
        u64::from(volume.volume_space_size) * u64::from(volume.logical_block_size)
    );
    println!(
        "Volume set:       {} of {}",
        volume.volume_sequence_number, volume.volume_set_size
    );
    if let Some(created) = &volume.creation_date {
        println!("Created:          {}", created);
    }
    if let Some(modified) = &volume.modification_date {
        println!("Modified:         {}", modified);
    }
    println!("Joliet:           {}", if volume.has_joliet { "yes" } else { "no" });
    println!(
        "Traversal root:   {:?} descriptor, extent {}, {} bytes",
        volume.root.descriptor, volume.root.extent_lba, volume.root.data_length
    );

    for descriptor in volume.primary.iter().chain(volume.supplementary.iter()) {
        print_descriptor(descriptor);
    }
    Ok(())
}

fn print_descriptor(descriptor: &VolumeDescriptor) {
    println!();
    println!("{:?} descriptor @ sector {}", descriptor.descriptor_type, descriptor.sector);
    println!("  version {}, {:?} names", descriptor.version, descriptor.encoding);
    println!("  volume ID {:?}", descriptor.volume_id);
    println!(
        "  root extent {} ({} bytes)",
        descriptor.root_extent_lba(),
        descriptor.root_data_length()
    );
    println!(
        "  path tables L@{} M@{} ({} bytes)",
        descriptor.type_l_path_table, descriptor.type_m_path_table, descriptor.path_table_size
    );
}

fn format_date(date: &DateTime7) -> String {
    if date.is_unset() {
        return "-".repeat(16);
    }
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}",
        date.full_year(),
        date.month,
        date.day,
        date.hour,
        date.minute
    )
}

fn print_entry(record: &DirectoryRecord) {
    let kind = if record.is_directory() { 'd' } else { '-' };
    let hidden = if record.is_hidden() { 'h' } else { '-' };
    println!(
        "{}{} {:>12} {} {}",
        kind,
        hidden,
        record.data_length,
        format_date(&record.recording_datetime),
        record.name
    );
}

fn ls(image: &Path, path: &str) -> Result<()> {
    let (mut source, volume) = open(image)?;
    let entries = list_directory(&mut source, &volume, path)
        .with_context(|| format!("cannot list {}", path))?;

    for entry in &entries {
        print_entry(entry);
    }
    Ok(())
}

fn tree(image: &Path) -> Result<()> {
    let (mut source, volume) = open(image)?;
    let tree = walk_all(&mut source, &volume.root).context("failed to walk directory tree")?;

    println!("/");
    for (_, node) in tree.iter() {
        let indent = "  ".repeat(node.depth);
        if node.record.is_directory() {
            println!("{}{}/", indent, node.record.name);
        } else {
            println!("{}{} ({} bytes)", indent, node.record.name, node.record.data_length);
        }
    }
    Ok(())
}

fn extract(image: &Path, path: &str, output: Option<&Path>) -> Result<()> {
    let (mut source, volume) = open(image)?;
    let record = find_file(&mut source, &volume, path).with_context(|| format!("cannot find {}", path))?;
    if record.is_directory() {
        bail!("{} is a directory", path);
    }

    let block_size = volume.root.block_size;
    match output {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create {}", dir.display()))?;
            let written = extract_to_dir(&mut source, block_size, &record, dir)
                .with_context(|| format!("failed to extract {}", path))?;
            log::info!("wrote {} ({} bytes)", written.display(), record.data_length);
        }
        None => {
            let stdout = std::io::stdout();
            let mut sink = stdout.lock();
            extract_to(&mut source, block_size, &record, &mut sink)
                .with_context(|| format!("failed to extract {}", path))?;
            sink.flush()?;
        }
    }
    Ok(())
}

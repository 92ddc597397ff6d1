mod cli;

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use bfs::{BLOCK_SIZE, Config, FileSystem, Geometry};
use bfs_fuse::BlockFile;
use block_dev::BlockDevice;
use clap::Parser;
use typed_bytesize::ByteSizeIec;
use vfs::OpenFlag;

use self::cli::{Cli, Command};

fn main() -> io::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    log::info!("image={:?}", cli.image);

    match cli.command {
        Command::Format { size, inodes } => {
            let disk_size = ByteSizeIec::mib(size).0;
            let total_blocks = u32::try_from(disk_size / BLOCK_SIZE as u64)
                .map_err(|_| io::Error::other("image too large"))?;
            let block_dev: Arc<dyn BlockDevice> =
                Arc::new(BlockFile::create(&cli.image, total_blocks as u64)?);
            FileSystem::format(block_dev, Geometry::new(total_blocks, inodes), Config::default())
                .map_err(to_io)?
                .sync();
            println!("formatted {total_blocks} blocks, {inodes} inodes");
        }
        Command::Pack { source } => {
            let mut fs = mount(&cli.image)?;

            for entry in fs::read_dir(&source)? {
                let entry = entry?;
                if !entry.file_type()?.is_file() {
                    continue;
                }
                let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                    log::warn!("skip non UTF-8 name {:?}", entry.file_name());
                    continue;
                };

                let data = fs::read(entry.path())?;
                let fd = fs.create(&name).map_err(to_io)?;
                fs.write(fd, &data).map_err(to_io)?;
                fs.close(fd).map_err(to_io)?;
                println!("file: {name:?} ({} bytes)", data.len());
            }
            fs.sync();
        }
        Command::Cat { name } => {
            let mut fs = mount(&cli.image)?;
            let fd = fs.open(&name, OpenFlag::existing()).map_err(to_io)?;

            let mut stdout = io::stdout().lock();
            let mut buf = vec![0u8; 8 * BLOCK_SIZE];
            loop {
                let len = fs.read(fd, &mut buf).map_err(to_io)?;
                if len == 0 {
                    break;
                }
                stdout.write_all(&buf[..len])?;
            }
            fs.close(fd).map_err(to_io)?;
        }
        Command::Ls => {
            let mut fs = mount(&cli.image)?;
            for name in fs.list() {
                let fd = fs.open(&name, OpenFlag::existing()).map_err(to_io)?;
                let stat = fs.stat(fd).map_err(to_io)?;
                fs.close(fd).map_err(to_io)?;
                println!("{:>4} {:>8} {name}", stat.inode, stat.size);
            }
        }
    }

    Ok(())
}

fn mount(image: &Path) -> io::Result<FileSystem> {
    let block_dev: Arc<dyn BlockDevice> = Arc::new(BlockFile::open(image)?);
    FileSystem::mount(block_dev, Config::default()).map_err(to_io)
}

fn to_io(e: vfs::Error) -> io::Error {
    io::Error::other(e.to_string())
}

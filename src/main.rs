use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use fatvol::{Attributes, DirectoryEntry, FileStore, Geometry, Volume};

/// Normalize shell input ("foo.txt", "FOO     TXT", ...) to the padded
/// 11-character on-disk form the library expects.
fn format_8_3(name: &str) -> String {
    let up = name.to_ascii_uppercase();
    // already in the padded on-disk form
    if up.len() == 11 && !up.contains('.') {
        return up;
    }
    let mut parts = up.splitn(2, '.');
    let base = parts.next().unwrap_or("");
    let ext = parts.next().unwrap_or("");
    let mut buf = [b' '; 11];
    for (i, &b) in base.as_bytes().iter().take(8).enumerate() {
        buf[i] = b;
    }
    for (i, &b) in ext.as_bytes().iter().take(3).enumerate() {
        buf[8 + i] = b;
    }
    buf.iter().map(|&b| b as char).collect()
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn print_geometry(g: &Geometry) {
    println!("Bytes per block:    {}", g.bytes_per_block);
    println!("Blocks per cluster: {}", g.blocks_per_cluster);
    println!("Reserved blocks:    {}", g.reserved_blocks);
    println!("FAT copies:         {}", g.num_fats);
    println!("Blocks per FAT:     {}", g.blocks_per_fat);
    println!("Root entries (max): {}", g.max_root_entries);
    println!("Bytes per cluster:  {}", g.bytes_per_cluster());
}

fn print_attributes(entry: &DirectoryEntry) {
    println!("Attributes of {}:", entry.display_name());
    println!("  Read-only: {}", yes_no(entry.attributes.contains(Attributes::READ_ONLY)));
    println!("  Hidden:    {}", yes_no(entry.attributes.contains(Attributes::HIDDEN)));
    println!("  System:    {}", yes_no(entry.attributes.contains(Attributes::SYSTEM)));
    println!("  Created:   {}", entry.created);
    println!("  Modified:  {}", entry.modified);
}

fn print_help() {
    println!("Commands:");
    println!("  info                 show boot parameters");
    println!("  ls                   list the root directory");
    println!("  cat <name>           print a file's content");
    println!("  attr <name>          show a file's attributes");
    println!("  put <host-file> <name>  import a host file into the image");
    println!("  mv <old> <new>       rename a file");
    println!("  rm <name>            delete a file");
    println!("  exit");
}

fn main() -> ExitCode {
    env_logger::init();

    let mut path: Option<String> = None;
    let mut format_blocks: Option<u16> = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--format" => match args.next().and_then(|v| v.parse::<u16>().ok()) {
                Some(blocks) => format_blocks = Some(blocks),
                None => {
                    eprintln!("usage: fatvol <image> [--format <blocks>]");
                    return ExitCode::FAILURE;
                }
            },
            _ => path = Some(arg),
        }
    }
    let path = path.unwrap_or_else(|| String::from("disk.img"));

    let mut store = if let Some(blocks) = format_blocks {
        let mut store = match FileStore::create(&path, blocks as u64 * 512) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{}: {}", path, e);
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = Volume::format(&mut store, blocks) {
            eprintln!("format failed: {}", e);
            return ExitCode::FAILURE;
        }
        println!("formatted {} ({} blocks)", path, blocks);
        store
    } else {
        match FileStore::open(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{}: {}", path, e);
                return ExitCode::FAILURE;
            }
        }
    };

    let mut volume = match Volume::mount(&mut store) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("mount failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("mounted {}", path);
    print_geometry(volume.geometry());
    println!("type 'help' for commands");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().ok();
        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line_trim = line.trim();
        if line_trim.is_empty() {
            continue;
        }
        let mut parts = line_trim.split_whitespace();
        let cmd = parts.next().unwrap_or("").to_ascii_lowercase();
        match cmd.as_str() {
            "help" => print_help(),
            "info" => print_geometry(volume.geometry()),
            "ls" => match volume.list_root() {
                Ok(list) => {
                    for entry in list.iter() {
                        println!("{}\t{} bytes", entry.display_name(), entry.file_size);
                    }
                }
                Err(e) => println!("ls error: {}", e),
            },
            "cat" => {
                if let Some(name) = parts.next() {
                    match volume.read_file(&format_8_3(name)) {
                        Ok(data) => match std::str::from_utf8(&data) {
                            Ok(s) => println!("{}", s),
                            Err(_) => {
                                let mut out = String::new();
                                for b in data.iter() {
                                    out.push_str(&format!("{:02x}", b));
                                }
                                println!("{}", out);
                            }
                        },
                        Err(e) => println!("cat error: {}", e),
                    }
                } else {
                    println!("usage: cat <name>");
                }
            }
            "attr" => {
                if let Some(name) = parts.next() {
                    let name11 = format_8_3(name);
                    match volume.list_root() {
                        Ok(list) => {
                            match list.iter().find(|e| e.name11() == name11.as_bytes()) {
                                Some(entry) => print_attributes(entry),
                                None => println!("attr error: file not found"),
                            }
                        }
                        Err(e) => println!("attr error: {}", e),
                    }
                } else {
                    println!("usage: attr <name>");
                }
            }
            "put" => {
                let host = parts.next();
                let name = parts.next();
                match (host, name) {
                    (Some(host), Some(name)) => match std::fs::read(host) {
                        Ok(content) => {
                            match volume.create_file(&format_8_3(name), &content) {
                                Ok(entry) => println!(
                                    "wrote {} ({} bytes)",
                                    entry.display_name(),
                                    entry.file_size
                                ),
                                Err(e) => println!("put error: {}", e),
                            }
                        }
                        Err(e) => println!("{}: {}", host, e),
                    },
                    _ => println!("usage: put <host-file> <name>"),
                }
            }
            "mv" => {
                let old = parts.next();
                let new = parts.next();
                match (old, new) {
                    (Some(old), Some(new)) => {
                        match volume.rename_file(&format_8_3(old), &format_8_3(new)) {
                            Ok(()) => println!("renamed {} to {}", old, new),
                            Err(e) => println!("mv error: {}", e),
                        }
                    }
                    _ => println!("usage: mv <old> <new>"),
                }
            }
            "rm" => {
                if let Some(name) = parts.next() {
                    match volume.remove_file(&format_8_3(name)) {
                        Ok(()) => println!("deleted {}", name),
                        Err(e) => println!("rm error: {}", e),
                    }
                } else {
                    println!("usage: rm <name>");
                }
            }
            "exit" | "quit" => break,
            other => println!("unknown command: {}", other),
        }
    }
    ExitCode::SUCCESS
}

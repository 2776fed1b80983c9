use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/pokedex/v1/pokedex.proto");
    println!("cargo:rerun-if-changed=proto");

    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);

    tonic_prost_build::configure()
        .build_client(true)
        .build_server(true)
        .file_descriptor_set_path(out_dir.join("pokedex_descriptor.bin"))
        .compile_protos(&["proto/pokedex/v1/pokedex.proto"], &["proto"])?;

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/spec/proto/runtime/v1/appcallback.proto");
    println!("cargo:rerun-if-changed=proto");

    tonic_prost_build::configure()
        .build_client(true)
        .build_server(true)
        .compile_protos(&["proto/spec/proto/runtime/v1/appcallback.proto"], &["proto"])?;

    Ok(())
}

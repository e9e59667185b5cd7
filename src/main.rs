fn main() {
    if let Err(e) = complaintops_lib::run() {
        eprintln!("complaintops: {e}");
        std::process::exit(1);
    }
}

pub mod receipt_file_gateway;

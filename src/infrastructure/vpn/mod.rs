pub mod key_value_device_key_sink;

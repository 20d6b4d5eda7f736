// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

#[cfg(test)]
mod tests {
    use dispatchrs::utils::telemetry;

    #[test]
    fn test_telemetry_initialization_is_repeatable() {
        telemetry::init_telemetry();
        // 再次初始化不应 panic
        telemetry::init_telemetry();

        tracing::info!(
            correlation_id = "abc123",
            targets = 2,
            "Batch dispatched"
        );
        tracing::warn!(reason = "timeout", "Job failed");
    }
}

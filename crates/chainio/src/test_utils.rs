use alloy::rpc::types::Log;
use alloy_primitives::{Address, B256, Bloom};
use mockito::{Matcher, Mock, Server};
use serde_json::{Value, json};

/// Mock a JSON-RPC `method` answering with `result`, echoing the request id.
pub async fn mock_rpc(server: &mut Server, method: &str, result: Value) -> Mock {
    mock_rpc_with(server, method, move |_| result.clone()).await
}

/// Mock a JSON-RPC `method` whose result is computed from the request params.
pub async fn mock_rpc_with<F>(server: &mut Server, method: &str, respond: F) -> Mock
where
    F: Fn(&Value) -> Value + Send + Sync + 'static,
{
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": method })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body_from_request(move |req| {
            let request: Value =
                serde_json::from_slice(req.body().expect("request body")).expect("json");
            let result = respond(&request["params"]);
            let response = json!({ "jsonrpc": "2.0", "id": request["id"], "result": result });
            serde_json::to_vec(&response).expect("serialize")
        })
        .create_async()
        .await
}

/// Parse a JSON-RPC quantity such as `"0x2a"`.
pub fn parse_quantity(value: &Value) -> Option<u64> {
    let hex = value.as_str()?.strip_prefix("0x")?;
    u64::from_str_radix(hex, 16).ok()
}

/// Returns the block range of an `eth_getLogs` request.
pub fn requested_range(params: &Value) -> (u64, u64) {
    let filter = &params[0];
    let from = parse_quantity(&filter["fromBlock"]).unwrap_or_default();
    let to = parse_quantity(&filter["toBlock"]).unwrap_or(u64::MAX);
    (from, to)
}

/// Returns the logs emitted inside the block range of an `eth_getLogs` request.
pub fn logs_in_range(logs: &[Log], params: &Value) -> Value {
    let (from, to) = requested_range(params);
    let matching = logs
        .iter()
        .filter(|log| log.block_number.is_some_and(|number| (from..=to).contains(&number)))
        .collect::<Vec<_>>();

    serde_json::to_value(matching).expect("serialize logs")
}

/// Mock `eth_getLogs`, answering each request with the logs inside its block range.
pub async fn mock_logs(server: &mut Server, logs: Vec<Log>) -> Mock {
    mock_rpc_with(server, "eth_getLogs", move |params| logs_in_range(&logs, params)).await
}

/// An empty block header at `number`, as returned by `eth_getBlockByNumber`.
pub fn block_json(number: u64, timestamp: u64) -> Value {
    json!({
        "hash": B256::with_last_byte(1),
        "parentHash": B256::ZERO,
        "sha3Uncles": B256::ZERO,
        "miner": Address::ZERO,
        "stateRoot": B256::ZERO,
        "transactionsRoot": B256::ZERO,
        "receiptsRoot": B256::ZERO,
        "logsBloom": Bloom::ZERO,
        "difficulty": "0x0",
        "number": format!("{number:#x}"),
        "gasLimit": "0x1c9c380",
        "gasUsed": "0x0",
        "timestamp": format!("{timestamp:#x}"),
        "extraData": "0x",
        "mixHash": B256::ZERO,
        "nonce": "0x0000000000000000",
        "uncles": [],
        "transactions": [],
    })
}

/// Mock `eth_getBlockByNumber`, answering with an empty block stamped by `timestamp`.
pub async fn mock_blocks(server: &mut Server, timestamp: fn(u64) -> u64) -> Mock {
    mock_rpc_with(server, "eth_getBlockByNumber", move |params| {
        parse_quantity(&params[0]).map_or(Value::Null, |number| block_json(number, timestamp(number)))
    })
    .await
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Bytes, LogData};

    use super::*;

    fn log_at(block_number: u64) -> Log {
        Log {
            inner: alloy_primitives::Log {
                address: Address::repeat_byte(0x11),
                data: LogData::new_unchecked(vec![], Bytes::new()),
            },
            block_number: Some(block_number),
            log_index: Some(0),
            ..Default::default()
        }
    }

    #[test]
    fn test_logs_in_range() {
        let logs = vec![log_at(4), log_at(5), log_at(9)];
        let params = json!([{ "fromBlock": "0x5", "toBlock": "0x8" }]);

        let matching: Vec<Log> = serde_json::from_value(logs_in_range(&logs, &params)).unwrap();
        assert_eq!(matching, vec![log_at(5)]);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(&json!("0x2a")), Some(42));
        assert_eq!(parse_quantity(&json!("latest")), None);
        assert_eq!(parse_quantity(&json!(42)), None);
    }
}

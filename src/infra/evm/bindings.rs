// ABI of the on-chain registry. Argument and return names must match the deployed
// contract for event decoding; return names give the generated structs their fields.

use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract DocumentRegistry {
        struct Document {
            bytes32 hash;
            uint256 timestamp;
            address signer;
            bytes signature;
        }

        event DocumentStored(bytes32 indexed hash, address indexed signer, uint256 timestamp, bytes signature);
        event DocumentVerified(bytes32 indexed hash, address indexed signer, bool isValid);

        function storeDocumentHash(bytes32 _hash, uint256 _timestamp, bytes _signature, address _signer) external;
        function verifyDocument(bytes32 _hash, address _signer, bytes _signature) external returns (bool isValid);
        function getDocumentInfo(bytes32 _hash) external view returns (Document document);
        function getDocumentSignature(bytes32 _hash) external view returns (bytes signature);
        function isDocumentStored(bytes32 _hash) external view returns (bool exists);
        function getDocumentCount() external view returns (uint256 count);
        function getDocumentHashByIndex(uint256 _index) external view returns (bytes32 hash);
    }
}
